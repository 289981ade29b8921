//! Folder services and tree engines.

pub mod copy;
pub mod service;
pub mod size;
pub mod tree;

pub use copy::CopyEngine;
pub use service::{FolderDetail, FolderService};
pub use size::SizePropagator;
pub use tree::{Subtree, TrashScope, TreeWalker};
