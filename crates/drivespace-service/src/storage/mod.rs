//! Tenant storage management and quota accounting.

pub mod service;

pub use service::StorageService;
