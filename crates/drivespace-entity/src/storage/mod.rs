//! Tenant storage entity and quota value object.

pub mod model;
pub mod quota;

pub use model::{CreateStorage, Storage};
pub use quota::QuotaUsage;
