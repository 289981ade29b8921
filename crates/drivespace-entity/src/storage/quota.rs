//! Quota usage value object.

use serde::{Deserialize, Serialize};

use super::model::Storage;

/// Usage report for a tenant storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaUsage {
    /// Total capacity in bytes.
    pub space: f64,
    /// Currently used bytes.
    pub used_space: f64,
    /// Available bytes.
    pub remaining: f64,
    /// Usage percentage (0.0 - 100.0).
    pub usage_percent: f64,
}

impl QuotaUsage {
    /// Build a usage report from a storage row.
    pub fn from_storage(storage: &Storage) -> Self {
        let usage_percent = if storage.space == 0.0 {
            0.0
        } else {
            (storage.used_space / storage.space) * 100.0
        };

        Self {
            space: storage.space,
            used_space: storage.used_space,
            remaining: storage.remaining(),
            usage_percent,
        }
    }
}
