//! Ancestor-chain size propagation.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use drivespace_core::error::AppError;
use drivespace_core::result::AppResult;
use drivespace_database::FolderRepo;

/// Applies a signed size delta to a folder and every one of its
/// ancestors up to the root.
///
/// Only this propagator and the quota ledger mutate the shared size
/// counters; callers never read-modify-write them.
#[derive(Clone)]
pub struct SizePropagator {
    folders: Arc<dyn FolderRepo>,
}

impl SizePropagator {
    /// Creates a new size propagator.
    pub fn new(folders: Arc<dyn FolderRepo>) -> Self {
        Self { folders }
    }

    /// Walk the ancestor chain starting at `folder_id` (inclusive) up to
    /// the root, then apply `delta` to every collected folder in one
    /// bulk update, all-or-nothing, with no partial propagation.
    ///
    /// A missing row mid-walk aborts with a consistency error before any
    /// write is issued. Returns the number of folders adjusted.
    pub async fn adjust(&self, folder_id: Uuid, delta: f64) -> AppResult<u64> {
        let mut ids = Vec::new();
        let mut current = folder_id;

        loop {
            let folder = self.folders.find_by_id(current).await?.ok_or_else(|| {
                AppError::consistency(format!(
                    "Folder {current} missing while propagating size delta"
                ))
            })?;
            ids.push(folder.id);

            match folder.parent_id {
                Some(parent_id) => current = parent_id,
                None => break,
            }
        }

        let touched = self.folders.adjust_sizes(&ids, delta).await?;
        debug!(start = %folder_id, delta, folders = touched, "Propagated size delta");
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use drivespace_database::memory::MemoryFolderRepository;
    use drivespace_entity::folder::CreateFolder;

    async fn chain(depth: usize) -> (Arc<MemoryFolderRepository>, Vec<Uuid>) {
        let folders = Arc::new(MemoryFolderRepository::new());
        let storage_id = Uuid::new_v4();
        let mut ids = Vec::new();

        let root = folders
            .create(&CreateFolder {
                storage_id,
                parent_id: None,
                name: "root".to_string(),
                size: 0.0,
            })
            .await
            .unwrap();
        ids.push(root.id);

        for i in 0..depth {
            let parent = *ids.last().unwrap();
            let child = folders
                .create(&CreateFolder::empty(storage_id, parent, format!("d{i}")))
                .await
                .unwrap();
            ids.push(child.id);
        }
        (folders, ids)
    }

    #[tokio::test]
    async fn test_delta_reaches_every_ancestor_and_stops_at_root() {
        let (folders, ids) = chain(3).await;
        let propagator = SizePropagator::new(folders.clone());

        let touched = propagator.adjust(*ids.last().unwrap(), 100.0).await.unwrap();
        assert_eq!(touched, 4);

        for id in &ids {
            assert_eq!(folders.find_by_id(*id).await.unwrap().unwrap().size, 100.0);
        }
    }

    #[tokio::test]
    async fn test_partial_chains_are_disjoint() {
        let (folders, ids) = chain(2).await;
        let propagator = SizePropagator::new(folders.clone());

        // Adjust from the middle: the leaf below must stay untouched.
        propagator.adjust(ids[1], 50.0).await.unwrap();
        assert_eq!(folders.find_by_id(ids[0]).await.unwrap().unwrap().size, 50.0);
        assert_eq!(folders.find_by_id(ids[1]).await.unwrap().unwrap().size, 50.0);
        assert_eq!(folders.find_by_id(ids[2]).await.unwrap().unwrap().size, 0.0);
    }

    #[tokio::test]
    async fn test_missing_start_row_is_a_consistency_error() {
        let (folders, _) = chain(1).await;
        let propagator = SizePropagator::new(folders);

        let err = propagator.adjust(Uuid::new_v4(), 10.0).await.unwrap_err();
        assert_eq!(err.kind, drivespace_core::error::ErrorKind::Consistency);
    }
}
