//! Blob store configuration.

use serde::{Deserialize, Serialize};

/// Blob store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Root directory for the local blob provider.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Directory (within the provider) where uploaded blobs are placed.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Base URL prefixed onto blob paths when building download URLs.
    #[serde(default = "default_public_url_base")]
    pub public_url_base: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            upload_dir: default_upload_dir(),
            public_url_base: default_public_url_base(),
        }
    }
}

fn default_root_path() -> String {
    "./data/blobs".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_public_url_base() -> String {
    "/blobs".to_string()
}
