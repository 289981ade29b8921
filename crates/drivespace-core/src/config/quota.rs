//! Tenant quota configuration.

use serde::{Deserialize, Serialize};

/// Quota settings applied when provisioning a tenant storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Space capacity granted to a freshly provisioned storage, in bytes.
    #[serde(default = "default_space_bytes")]
    pub default_space_bytes: f64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_space_bytes: default_space_bytes(),
        }
    }
}

fn default_space_bytes() -> f64 {
    // 1 GiB
    1_073_741_824.0
}
