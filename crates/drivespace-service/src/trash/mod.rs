//! Soft-delete, restore, and permanent deletion.

pub mod service;

pub use service::{TrashIndex, TrashService};
