// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{adapter_over, mounted};
use crate::adapter::FilesystemAdapter;
use crate::cache::CacheConfig;
use crate::error::Error;
use crate::memory::MemoryStore;
use crate::remote::{RemoteError, RemoteErrorKind};
use crate::session::DriveSession;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_repeated_reads_hit_the_cache() {
    let (store, fs) = mounted();
    store.seed_file("/a.txt", b"a").await;

    assert!(fs.exists("/a.txt").await.unwrap());
    assert!(fs.exists("/A.TXT").await.unwrap());
    assert!(!fs.is_container("a.txt").await.unwrap());

    assert_eq!(store.calls("get_metadata").await, 1);
    let stats = fs.cache_stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
}

#[tokio::test]
async fn test_absence_is_cached() {
    let (store, fs) = mounted();

    assert!(!fs.exists("/nope").await.unwrap());
    store.seed_file("/nope", b"late").await;
    assert!(!fs.exists("/nope").await.unwrap());
    assert_eq!(store.calls("get_metadata").await, 1);
}

#[tokio::test]
async fn test_listing_primes_item_lookups() {
    let (store, fs) = mounted();
    store.seed_file("/p/one.txt", b"1").await;
    store.seed_folder("/p/Two").await;

    _ = fs.get_children("/p", false).await.unwrap();
    assert!(fs.exists("/p/one.txt").await.unwrap());
    assert!(fs.is_container("/p/two").await.unwrap());
    assert_eq!(store.calls("get_metadata").await, 0);
}

#[tokio::test]
async fn test_mutation_invalidates_everything() {
    let (store, fs) = mounted();
    store.seed_file("/m/a.txt", b"a").await;

    assert!(fs.exists("/m/a.txt").await.unwrap());
    _ = fs.get_children("/m", false).await.unwrap();

    _ = fs.new_item("/m/b.txt", "file", None).await.unwrap();

    let children = fs.get_children("/m", false).await.unwrap();
    assert_eq!(children.len(), 2);
    assert!(fs.exists("/m/a.txt").await.unwrap());
    assert_eq!(store.calls("list_children").await, 2);
    // The second listing primed a.txt again
    assert_eq!(store.calls("get_metadata").await, 1);
    assert_eq!(fs.cache_stats().await.resets, 1);
}

#[tokio::test]
async fn test_failed_mutation_still_invalidates() {
    let (store, fs) = mounted();

    assert!(!fs.exists("/x.txt").await.unwrap());
    store.seed_file("/x.txt", b"x").await;
    store
        .fail_next("delete", RemoteError::new(RemoteErrorKind::Transient, "busy"))
        .await;

    assert!(fs.remove_item("/x.txt", false).await.is_err());
    assert!(fs.exists("/x.txt").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_entries_expire_after_refresh_window() {
    let store = Arc::new(MemoryStore::new());
    store.seed_file("/e.txt", b"e").await;
    let fs = FilesystemAdapter::with_session(
        DriveSession::with_client("test", store.clone()),
        CacheConfig {
            refresh_window: Duration::from_secs(300),
        },
    );

    assert!(fs.exists("/e.txt").await.unwrap());
    tokio::time::advance(Duration::from_secs(299)).await;
    assert!(fs.exists("/e.txt").await.unwrap());
    assert_eq!(store.calls("get_metadata").await, 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(fs.exists("/e.txt").await.unwrap());
    assert_eq!(store.calls("get_metadata").await, 2);
    assert_eq!(fs.cache_stats().await.expirations, 1);
}

#[tokio::test]
async fn test_remote_errors_are_not_cached() {
    let (store, fs) = mounted();
    store.seed_file("/u.txt", b"u").await;
    store
        .fail_next(
            "get_metadata",
            RemoteError::new(RemoteErrorKind::Unauthorized, "expired_access_token"),
        )
        .await;

    match fs.exists("/u.txt").await {
        Err(Error::Remote { kind, .. }) => assert_eq!(kind, RemoteErrorKind::Unauthorized),
        other => panic!("unexpected {other:?}"),
    }
    assert!(fs.exists("/u.txt").await.unwrap());
    assert_eq!(store.calls("get_metadata").await, 2);
}

#[tokio::test]
async fn test_adapters_do_not_share_caches() {
    let store = Arc::new(MemoryStore::new());
    store.seed_file("/s.txt", b"s").await;
    let first = adapter_over(store.clone());
    let second = adapter_over(store.clone());

    assert!(first.exists("/s.txt").await.unwrap());
    assert!(second.exists("/s.txt").await.unwrap());
    assert_eq!(store.calls("get_metadata").await, 2);
}
