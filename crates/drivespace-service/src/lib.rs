//! # drivespace-service
//!
//! Business logic for DriveSpace: the tree mutation engines (naming
//! resolver, size propagator, tree walker, copy engine, trash engine,
//! quota ledger) and the boundary services that orchestrate them.
//!
//! Services follow constructor injection; repositories and the blob
//! store are provided at construction time via `Arc` references, so the
//! same engine code runs over Postgres in production and over the
//! in-memory stores in tests.

pub mod context;
pub mod file;
pub mod folder;
pub mod naming;
pub mod storage;
pub mod trash;

pub use context::RequestContext;
pub use file::FileService;
pub use folder::{CopyEngine, FolderService, SizePropagator, TreeWalker};
pub use naming::NameResolver;
pub use storage::StorageService;
pub use trash::TrashService;
