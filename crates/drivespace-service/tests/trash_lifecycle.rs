//! Soft-delete, restore, and hard-delete behavior of the trash engine.

mod common;

use common::env;
use drivespace_core::error::ErrorKind;
use drivespace_core::traits::blob::BlobStore;
use drivespace_database::{FileRepo, FolderRepo};

#[tokio::test]
async fn test_soft_delete_flags_descendants_and_debits_ancestors() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let sub = fx.mkdir(docs.id, "sub").await;
    let f = fx.upload(docs.id, "f", 100).await;
    let g = fx.upload(sub.id, "g", 50).await;

    let trashed = fx
        .trash_svc
        .soft_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    // The target becomes a trash root; descendants are only flagged.
    assert!(trashed.deleted_at.is_some());
    assert!(!trashed.parent_trashed);
    let sub_after = fx.folder(sub.id).await;
    assert!(sub_after.parent_trashed);
    assert!(sub_after.deleted_at.is_none());
    assert!(fx.file(f.id).await.folder_trashed);
    assert!(fx.file(g.id).await.folder_trashed);
    assert!(fx.file(f.id).await.deleted_at.is_none());

    // Ancestor sizes drop; the subtree's own sizes and the quota do not.
    assert_eq!(fx.folder(fx.root.id).await.size, 0.0);
    assert_eq!(fx.folder(docs.id).await.size, 150.0);
    assert_eq!(fx.folder(sub.id).await.size, 50.0);
    assert_eq!(fx.used_space().await, 150.0);

    // Only the trash root shows up in the index.
    let index = fx.trash_svc.list_trash(&fx.ctx).await.unwrap();
    assert_eq!(index.folders.len(), 1);
    assert_eq!(index.folders[0].id, docs.id);
    assert!(index.files.is_empty());
}

#[tokio::test]
async fn test_restore_round_trips_to_pre_delete_state() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let sub = fx.mkdir(docs.id, "sub").await;
    let f = fx.upload(docs.id, "f", 100).await;
    let g = fx.upload(sub.id, "g", 50).await;

    fx.trash_svc
        .soft_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();
    let restored = fx
        .trash_svc
        .restore_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    assert!(restored.deleted_at.is_none());
    assert!(!fx.folder(sub.id).await.parent_trashed);
    assert!(!fx.file(f.id).await.folder_trashed);
    assert!(!fx.file(g.id).await.folder_trashed);

    assert_eq!(fx.folder(fx.root.id).await.size, 150.0);
    assert_eq!(fx.folder(docs.id).await.size, 150.0);
    assert_eq!(fx.folder(sub.id).await.size, 50.0);
    assert_eq!(fx.used_space().await, 150.0);

    assert!(fx.trash_svc.list_trash(&fx.ctx).await.unwrap().folders.is_empty());
}

#[tokio::test]
async fn test_independently_trashed_subtree_keeps_its_own_state() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let sub = fx.mkdir(docs.id, "sub").await;
    let f = fx.upload(docs.id, "f", 100).await;
    let g = fx.upload(sub.id, "g", 50).await;

    // `sub` goes to trash on its own, then `docs` follows.
    fx.trash_svc
        .soft_delete_folder(&fx.ctx, sub.id)
        .await
        .unwrap();
    assert_eq!(fx.folder(docs.id).await.size, 100.0);
    fx.trash_svc
        .soft_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    // The inner trash root is re-flagged but its subtree stays untouched.
    let sub_after = fx.folder(sub.id).await;
    assert!(sub_after.deleted_at.is_some());
    assert!(sub_after.parent_trashed);
    assert!(fx.file(f.id).await.folder_trashed);
    assert!(fx.file(g.id).await.folder_trashed);

    // Restoring `docs` brings back everything except `sub`'s own trash.
    fx.trash_svc
        .restore_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    let sub_restored = fx.folder(sub.id).await;
    assert!(sub_restored.deleted_at.is_some());
    assert!(!sub_restored.parent_trashed);
    assert!(!fx.file(f.id).await.folder_trashed);
    assert!(fx.file(g.id).await.folder_trashed);
    assert_eq!(fx.folder(fx.root.id).await.size, 100.0);
    assert_eq!(fx.folder(docs.id).await.size, 100.0);

    // Restoring `sub` completes the round trip.
    fx.trash_svc.restore_folder(&fx.ctx, sub.id).await.unwrap();
    assert!(!fx.file(g.id).await.folder_trashed);
    assert_eq!(fx.folder(docs.id).await.size, 150.0);
    assert_eq!(fx.folder(fx.root.id).await.size, 150.0);
}

#[tokio::test]
async fn test_restore_blocked_while_ancestor_trash_root_intact() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let sub = fx.mkdir(docs.id, "sub").await;

    fx.trash_svc
        .soft_delete_folder(&fx.ctx, sub.id)
        .await
        .unwrap();
    fx.trash_svc
        .soft_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    let err = fx
        .trash_svc
        .restore_folder(&fx.ctx, sub.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
    assert!(fx.folder(sub.id).await.deleted_at.is_some());
}

#[tokio::test]
async fn test_soft_delete_and_restore_single_files() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let f = fx.upload(docs.id, "f", 100).await;

    let trashed = fx
        .trash_svc
        .soft_delete_files(&fx.ctx, &[f.id])
        .await
        .unwrap();
    assert!(trashed[0].deleted_at.is_some());
    assert_eq!(fx.folder(docs.id).await.size, 0.0);
    assert_eq!(fx.folder(fx.root.id).await.size, 0.0);
    assert_eq!(fx.used_space().await, 100.0);

    let index = fx.trash_svc.list_trash(&fx.ctx).await.unwrap();
    assert_eq!(index.files.len(), 1);

    // Re-deleting is a precondition failure.
    let err = fx
        .trash_svc
        .soft_delete_files(&fx.ctx, &[f.id])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);

    let restored = fx.trash_svc.restore_file(&fx.ctx, f.id).await.unwrap();
    assert!(restored.deleted_at.is_none());
    assert_eq!(fx.folder(docs.id).await.size, 100.0);
    assert_eq!(fx.folder(fx.root.id).await.size, 100.0);
}

#[tokio::test]
async fn test_restore_file_blocked_inside_trashed_folder() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let f = fx.upload(docs.id, "f", 100).await;

    fx.trash_svc
        .soft_delete_files(&fx.ctx, &[f.id])
        .await
        .unwrap();
    fx.trash_svc
        .soft_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    let err = fx
        .trash_svc
        .restore_file(&fx.ctx, f.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
}

#[tokio::test]
async fn test_hard_delete_active_files_releases_everything() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let f = fx.upload(docs.id, "f", 100).await;

    let removed = fx
        .trash_svc
        .hard_delete_files(&fx.ctx, &[f.id])
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert!(fx.files.find_by_id(f.id).await.unwrap().is_none());
    assert!(!fx.blob.exists(&f.blob_path).await.unwrap());
    assert_eq!(fx.used_space().await, 0.0);
    assert_eq!(fx.folder(docs.id).await.size, 0.0);
    assert_eq!(fx.folder(fx.root.id).await.size, 0.0);
}

#[tokio::test]
async fn test_hard_delete_blocked_through_trashed_ancestor() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let f = fx.upload(docs.id, "f", 100).await;

    fx.trash_svc
        .soft_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    let err = fx
        .trash_svc
        .hard_delete_files(&fx.ctx, &[f.id])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
    assert!(fx.files.find_by_id(f.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_hard_delete_of_trashed_folder_does_not_double_debit() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let f = fx.upload(docs.id, "f", 100).await;

    fx.trash_svc
        .soft_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();
    assert_eq!(fx.folder(fx.root.id).await.size, 0.0);

    fx.trash_svc
        .hard_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    // The soft delete already debited the chain; only quota moves now.
    assert_eq!(fx.folder(fx.root.id).await.size, 0.0);
    assert_eq!(fx.used_space().await, 0.0);
    assert!(fx.folders.find_by_id(docs.id).await.unwrap().is_none());
    assert!(fx.files.find_by_id(f.id).await.unwrap().is_none());
    assert_eq!(fx.blob.len(), 0);
}

#[tokio::test]
async fn test_hard_delete_of_active_folder_debits_chain_once() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let sub = fx.mkdir(docs.id, "sub").await;
    fx.upload(docs.id, "f", 100).await;
    fx.upload(sub.id, "g", 50).await;

    let removed = fx
        .trash_svc
        .hard_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    // Two files and two folders gone.
    assert_eq!(removed, 4);
    assert_eq!(fx.folder(fx.root.id).await.size, 0.0);
    assert_eq!(fx.used_space().await, 0.0);
    assert_eq!(fx.blob.len(), 0);
    assert!(fx.folders.find_by_id(sub.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_trash_detail_lists_trashed_children() {
    let fx = env().await;
    let docs = fx.mkdir(fx.root.id, "docs").await;
    let sub = fx.mkdir(docs.id, "sub").await;
    let f = fx.upload(docs.id, "f", 10).await;

    fx.trash_svc
        .soft_delete_folder(&fx.ctx, docs.id)
        .await
        .unwrap();

    let detail = fx
        .trash_svc
        .trash_folder_detail(&fx.ctx, docs.id)
        .await
        .unwrap();
    assert_eq!(detail.folder.id, docs.id);
    assert_eq!(detail.sub_folders.len(), 1);
    assert_eq!(detail.sub_folders[0].id, sub.id);
    assert_eq!(detail.files.len(), 1);
    assert_eq!(detail.files[0].id, f.id);

    // Active folders have no trash detail.
    let err = fx
        .trash_svc
        .trash_folder_detail(&fx.ctx, fx.root.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
