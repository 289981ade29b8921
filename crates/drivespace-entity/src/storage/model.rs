//! Tenant storage entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant's storage space: one per user, quota-bounded.
///
/// `used_space` is adjusted only through the quota ledger, never by
/// callers doing read-modify-write.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Storage {
    /// Unique storage identifier.
    pub id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// Total space capacity in bytes.
    pub space: f64,
    /// Currently used space in bytes.
    pub used_space: f64,
    /// When the storage was created.
    pub created_at: DateTime<Utc>,
    /// When the storage was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    /// Check whether adding `delta` bytes stays within capacity.
    pub fn fits(&self, delta: f64) -> bool {
        self.used_space + delta <= self.space
    }

    /// Remaining free space in bytes (never negative).
    pub fn remaining(&self) -> f64 {
        (self.space - self.used_space).max(0.0)
    }
}

/// Data required to create a new tenant storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStorage {
    /// The owning user.
    pub user_id: Uuid,
    /// Total space capacity in bytes.
    pub space: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(space: f64, used: f64) -> Storage {
        Storage {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            space,
            used_space: used,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fits_at_exact_boundary() {
        let s = storage(1000.0, 400.0);
        assert!(s.fits(600.0));
        assert!(!s.fits(600.1));
    }

    #[test]
    fn test_remaining_clamps_to_zero() {
        let s = storage(1000.0, 1200.0);
        assert_eq!(s.remaining(), 0.0);
    }
}
