//! # drivespace-database
//!
//! PostgreSQL connection management, the repository traits the tree
//! mutation engines are written against, and their concrete
//! implementations: sqlx/Postgres for production, in-memory for the
//! engine test-suites and single-process embedding.
//!
//! Schema migrations are managed outside this crate; the repositories
//! assume the `storages`, `folders`, and `files` tables exist.

pub mod connection;
pub mod memory;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{FileRepo, FolderRepo, StorageRepo};
