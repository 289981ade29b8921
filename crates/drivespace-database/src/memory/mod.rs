//! In-memory repository implementations.
//!
//! Backed by `dashmap`, these implement the same repository traits as the
//! Postgres repositories and power the engine test-suites and
//! single-process embedding. Multi-field queries scan the map; fine at
//! test scale.

pub mod store;

pub use store::{MemoryFileRepository, MemoryFolderRepository, MemoryStorageRepository};
