//! # drivespace-core
//!
//! Core crate for DriveSpace. Contains configuration schemas, the blob
//! store contract, the logging bootstrap, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DriveSpace crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
