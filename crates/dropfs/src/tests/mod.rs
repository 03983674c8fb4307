// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

mod caching;

use crate::adapter::FilesystemAdapter;
use crate::cache::CacheConfig;
use crate::memory::MemoryStore;
use crate::metadata::{ItemMetadata, RevisionEntry};
use crate::remote::{ByteStream, RemoteError, RemoteErrorKind, RemoteResult, RemoteStore};
use crate::session::DriveSession;
use async_trait::async_trait;
use std::sync::Arc;

/// A memory store and an adapter mounted on it
pub(crate) fn mounted() -> (Arc<MemoryStore>, FilesystemAdapter) {
    let store = Arc::new(MemoryStore::new());
    let adapter = adapter_over(store.clone());
    (store, adapter)
}

pub(crate) fn adapter_over(store: Arc<dyn RemoteStore>) -> FilesystemAdapter {
    FilesystemAdapter::with_session(
        DriveSession::with_client("test", store),
        CacheConfig::default(),
    )
}

fn names(items: &[crate::metadata::ProviderItem]) -> Vec<&str> {
    items.iter().map(|i| i.metadata.name.as_str()).collect()
}

/// Serves one fixed listing for every folder; nothing else is supported
pub(crate) struct ListingStub {
    pub children: Vec<ItemMetadata>,
}

fn unsupported<T>() -> RemoteResult<T> {
    Err(RemoteError::new(RemoteErrorKind::Other, "unsupported"))
}

#[async_trait]
impl RemoteStore for ListingStub {
    async fn get_metadata(&self, _path: &str) -> RemoteResult<ItemMetadata> {
        unsupported()
    }

    async fn list_children(&self, _path: &str) -> RemoteResult<Vec<ItemMetadata>> {
        Ok(self.children.clone())
    }

    async fn upload(&self, _path: &str, _content: ByteStream) -> RemoteResult<ItemMetadata> {
        unsupported()
    }

    async fn download(&self, _path: &str) -> RemoteResult<ByteStream> {
        unsupported()
    }

    async fn copy(&self, _from: &str, _to: &str) -> RemoteResult<ItemMetadata> {
        unsupported()
    }

    async fn move_item(&self, _from: &str, _to: &str) -> RemoteResult<ItemMetadata> {
        unsupported()
    }

    async fn delete(&self, _path: &str) -> RemoteResult<ItemMetadata> {
        unsupported()
    }

    async fn create_folder(&self, _path: &str) -> RemoteResult<ItemMetadata> {
        unsupported()
    }

    async fn list_revisions(&self, _path: &str, _limit: u64) -> RemoteResult<Vec<RevisionEntry>> {
        unsupported()
    }

    async fn restore_revision(&self, _path: &str, _revision: &str) -> RemoteResult<ItemMetadata> {
        unsupported()
    }
}
