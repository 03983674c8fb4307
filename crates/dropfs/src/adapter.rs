// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Filesystem verbs over a mounted drive
//!
//! Every verb canonicalizes its paths first. Reads go through the metadata
//! cache and treat "not found" as absence. Mutations clear the whole cache
//! before calling the remote store, and any failure they meet terminates the
//! verb. Nothing here retries; the host decides whether to try again.

use crate::cache::{CacheConfig, CacheStats, MetadataCache};
use crate::error::{Error, Result};
use crate::item_type::ItemType;
use crate::metadata::{ItemMetadata, ProviderItem, RevisionEntry};
use crate::path::{WILDCARD, is_root, is_valid_path, join, normalize, split_path};
use crate::remote::{ByteStream, RemoteResult, RemoteStore};
use crate::session::DriveSession;
use crate::translate::mutation_outcome;
use crate::wildcard::WildcardPattern;
use diagnostics::*;
use std::cmp::Ordering;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Revision listings never ask for fewer entries than this
pub const DEFAULT_REVISION_LIMIT: u64 = 10;

/// Listing order: folders before files, then by name ignoring case
#[must_use]
pub fn listing_order(a: &ItemMetadata, b: &ItemMetadata) -> Ordering {
    b.is_folder
        .cmp(&a.is_folder)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// The provider side of one mounted drive
///
/// The cache belongs to the adapter, so two adapters never see each other's
/// entries. Verbs take `&self`; the host is expected to call them one at a
/// time per drive.
pub struct FilesystemAdapter {
    drive: Option<DriveSession>,
    cache: Mutex<MetadataCache>,
    staging_dir: Option<PathBuf>,
}

impl std::fmt::Debug for FilesystemAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemAdapter")
            .field("drive", &self.drive)
            .field("staging_dir", &self.staging_dir)
            .finish_non_exhaustive()
    }
}

impl FilesystemAdapter {
    /// An adapter with no drive mounted yet
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            drive: None,
            cache: Mutex::new(MetadataCache::new(config)),
            staging_dir: None,
        }
    }

    #[must_use]
    pub fn with_session(session: DriveSession, config: CacheConfig) -> Self {
        let mut adapter = Self::new(config);
        adapter.drive = Some(session);
        adapter
    }

    /// Stage new-file payloads in `dir` instead of the system temp directory
    #[must_use]
    pub fn with_staging_dir(mut self, dir: PathBuf) -> Self {
        self.staging_dir = Some(dir);
        self
    }

    pub async fn mount(&mut self, session: DriveSession) {
        info!("Mounting drive {drive}", drive: session.name());
        self.drive = Some(session);
        self.cache.lock().await.reset();
    }

    /// Detach the drive; the remote grant is left untouched
    pub async fn unmount(&mut self) -> Option<DriveSession> {
        self.cache.lock().await.reset();
        let drive = self.drive.take();
        if let Some(session) = &drive {
            info!("Unmounted drive {drive}", drive: session.name());
        }
        drive
    }

    #[must_use]
    pub fn drive(&self) -> Option<&DriveSession> {
        self.drive.as_ref()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    pub async fn reset_cache(&self) {
        self.cache.lock().await.reset();
    }

    fn client(&self) -> Result<Arc<dyn RemoteStore>> {
        match &self.drive {
            Some(session) => Ok(session.client()),
            None => {
                warn!("No drive mounted for this provider");
                Err(Error::NoDriveAssociatedWithProvider)
            }
        }
    }

    /// Cached metadata lookup; not-found is `None`
    async fn lookup(&self, path: &str) -> Result<Option<ItemMetadata>> {
        let client = self.client()?;
        let mut cache = self.cache.lock().await;
        cache
            .get_item(path, |p| async move { client.get_metadata(&p).await })
            .await
    }

    /// Cached folder listing; not-found is `None`
    async fn listing(&self, path: &str) -> Result<Option<Vec<ItemMetadata>>> {
        let client = self.client()?;
        let mut cache = self.cache.lock().await;
        cache
            .get_children(path, |p| async move { client.list_children(&p).await })
            .await
    }

    /// Uncached remote call; every failure terminates the verb
    pub(crate) async fn dispatch<T, F, Fut>(
        &self,
        op: &'static str,
        target: &str,
        call: F,
    ) -> Result<T>
    where
        F: FnOnce(Arc<dyn RemoteStore>) -> Fut,
        Fut: Future<Output = RemoteResult<T>>,
    {
        let client = self.client()?;
        debug!("Remote {op}({target})", op: op, target: target);
        mutation_outcome(call(client).await).inspect_err(|e| {
            let error_str = e.to_string();
            warn!("{op}({target}) failed: {error}", op: op, target: target, error: error_str);
        })
    }

    /// Mutation targets must be valid and must not be the root
    pub(crate) fn validate_target(path: &str) -> Result<()> {
        if is_root(path) || !is_valid_path(path) {
            return Err(Error::invalid_path(path));
        }
        Ok(())
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        let path = normalize(path);
        debug!("Invoking exists({path})", path: path.as_str());
        _ = self.client()?;

        if is_root(&path) {
            return Ok(true);
        }
        // Wildcards are resolved by expand_path, never by existence checks
        if path.ends_with(WILDCARD) {
            return Ok(false);
        }
        Ok(self.lookup(&path).await?.is_some())
    }

    pub async fn is_container(&self, path: &str) -> Result<bool> {
        let path = normalize(path);
        debug!("Invoking is_container({path})", path: path.as_str());
        _ = self.client()?;

        if is_root(&path) {
            return Ok(true);
        }
        Ok(self
            .lookup(&path)
            .await?
            .is_some_and(|item| item.is_folder))
    }

    pub async fn has_children(&self, path: &str) -> Result<bool> {
        let path = normalize(path);
        debug!("Invoking has_children({path})", path: path.as_str());
        _ = self.client()?;

        if !is_root(&path) && !self.lookup(&path).await?.is_some_and(|item| item.is_folder) {
            return Ok(false);
        }
        Ok(self
            .listing(&path)
            .await?
            .is_some_and(|children| !children.is_empty()))
    }

    /// The item at `path`; the root yields nothing
    pub async fn get_item(&self, path: &str) -> Result<Option<ProviderItem>> {
        let path = normalize(path);
        debug!("Invoking get_item({path})", path: path.as_str());

        if is_root(&path) {
            return Ok(None);
        }
        Ok(self.lookup(&path).await?.map(ProviderItem::from))
    }

    /// Children of `path`, optionally with all descendants
    ///
    /// The result is ordered by [`listing_order`]. A missing folder has no
    /// children.
    pub async fn get_children(&self, path: &str, recurse: bool) -> Result<Vec<ProviderItem>> {
        let path = normalize(path);
        debug!("Invoking get_children({path}, {recurse})", path: path.as_str(), recurse: recurse);
        _ = self.client()?;

        let mut items = Vec::new();
        let mut pending = vec![path];
        while let Some(dir) = pending.pop() {
            let children = self.listing(&dir).await?.unwrap_or_default();
            if recurse {
                pending.extend(
                    children
                        .iter()
                        .rev()
                        .filter(|child| child.is_folder)
                        .map(|child| normalize(&child.path)),
                );
            }
            items.extend(children);
        }

        items.sort_by(listing_order);
        Ok(items.into_iter().map(ProviderItem::from).collect())
    }

    /// Copy an item; the result is tagged with the destination path
    ///
    /// Folders are always copied with their contents, so `recurse` only
    /// affects the trace.
    pub async fn copy_item(&self, path: &str, dest: &str, recurse: bool) -> Result<ProviderItem> {
        self.reset_cache().await;

        let from = normalize(path);
        let to = normalize(dest);
        debug!("Invoking copy_item({from}, {to}, {recurse})", from: from.as_str(), to: to.as_str(), recurse: recurse);
        Self::validate_target(&from)?;
        Self::validate_target(&to)?;

        let (src, dst) = (from.clone(), to.clone());
        let metadata = self
            .dispatch("copy", &from, |client| async move { client.copy(&src, &dst).await })
            .await?;
        info!("Copied {from} to {to}", from: from.as_str(), to: to.as_str());

        let is_container = self.is_container(&to).await?;
        Ok(ProviderItem::tagged(metadata, to, is_container))
    }

    pub async fn move_item(&self, path: &str, dest: &str) -> Result<ProviderItem> {
        self.reset_cache().await;

        let from = normalize(path);
        let to = normalize(dest);
        debug!("Invoking move_item({from}, {to})", from: from.as_str(), to: to.as_str());
        Self::validate_target(&from)?;
        Self::validate_target(&to)?;

        let (src, dst) = (from.clone(), to.clone());
        let metadata = self
            .dispatch("move", &from, |client| async move { client.move_item(&src, &dst).await })
            .await?;
        info!("Moved {from} to {to}", from: from.as_str(), to: to.as_str());

        let is_container = self.is_container(&to).await?;
        Ok(ProviderItem::tagged(metadata, to, is_container))
    }

    /// Delete an item; folders go with their contents
    pub async fn remove_item(&self, path: &str, recurse: bool) -> Result<ProviderItem> {
        self.reset_cache().await;

        let path = normalize(path);
        debug!("Invoking remove_item({path}, {recurse})", path: path.as_str(), recurse: recurse);
        Self::validate_target(&path)?;

        let target = path.clone();
        let metadata = self
            .dispatch("delete", &path, |client| async move { client.delete(&target).await })
            .await?;
        info!("Removed {path}", path: path.as_str());
        Ok(metadata.into())
    }

    /// Create a folder or a file
    ///
    /// File payloads are staged to a temporary file which is removed again
    /// whether or not the upload succeeds.
    pub async fn new_item(
        &self,
        path: &str,
        item_type: &str,
        payload: Option<&[u8]>,
    ) -> Result<ProviderItem> {
        self.reset_cache().await;

        let path = normalize(path);
        debug!("Invoking new_item({path}, {item_type})", path: path.as_str(), item_type: item_type);
        let item_type = ItemType::parse(item_type)?;
        Self::validate_target(&path)?;

        let target = path.clone();
        let metadata = match item_type {
            ItemType::Directory => {
                self.dispatch("create_folder", &path, |client| async move {
                    client.create_folder(&target).await
                })
                .await?
            }
            ItemType::File => {
                let staged = self.stage(payload.unwrap_or_default())?;
                let outcome = match tokio::fs::File::open(staged.path()).await {
                    Ok(file) => {
                        let stream: ByteStream = Box::pin(file);
                        self.dispatch("upload", &path, |client| async move {
                            client.upload(&target, stream).await
                        })
                        .await
                    }
                    Err(e) => Err(e.into()),
                };
                if let Err(e) = staged.close() {
                    let error_str = e.to_string();
                    warn!("Failed to remove staged upload: {error}", error: error_str);
                }
                outcome?
            }
        };

        info!("Created {item_type} {path}", item_type: item_type.as_str(), path: path.as_str());
        Ok(ProviderItem::tagged(
            metadata,
            path,
            item_type == ItemType::Directory,
        ))
    }

    fn stage(&self, payload: &[u8]) -> Result<tempfile::NamedTempFile> {
        let mut staged = match &self.staging_dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new()?,
        };
        staged.write_all(payload)?;
        staged.flush()?;
        Ok(staged)
    }

    /// Resolve a wildcard in the last path segment
    ///
    /// Returns the full paths of matching children of the parent folder, or
    /// `None` when nothing matches (or the parent is empty or missing).
    pub async fn expand_path(&self, path: &str) -> Result<Option<Vec<String>>> {
        let path = normalize(path);
        debug!("Invoking expand_path({path})", path: path.as_str());
        let (parent, leaf) = split_path(&path);

        let children = match self.listing(parent).await? {
            Some(children) if !children.is_empty() => children,
            _ => return Ok(None),
        };

        let pattern = WildcardPattern::new(leaf)?;
        let matches: Vec<String> = children
            .iter()
            .filter(|child| pattern.matches(&child.name))
            .map(|child| join(parent, &child.name))
            .collect();

        Ok(if matches.is_empty() { None } else { Some(matches) })
    }

    /// Revision history of a file, newest first
    ///
    /// At least [`DEFAULT_REVISION_LIMIT`] entries are requested.
    pub async fn list_revisions(&self, path: &str, limit: u64) -> Result<Vec<RevisionEntry>> {
        let path = normalize(path);
        let limit = limit.max(DEFAULT_REVISION_LIMIT);
        debug!("Invoking list_revisions({path}, {limit})", path: path.as_str(), limit: limit);
        Self::validate_target(&path)?;

        let target = path.clone();
        self.dispatch("list_revisions", &path, |client| async move {
            client.list_revisions(&target, limit).await
        })
        .await
    }

    /// Bring a file back to an earlier revision
    pub async fn restore_revision(&self, path: &str, revision: &str) -> Result<ProviderItem> {
        self.reset_cache().await;

        let path = normalize(path);
        debug!("Invoking restore_revision({path}, {revision})", path: path.as_str(), revision: revision);
        Self::validate_target(&path)?;

        let target = path.clone();
        let revision = revision.to_string();
        let metadata = self
            .dispatch("restore_revision", &path, |client| async move {
                client.restore_revision(&target, &revision).await
            })
            .await?;
        info!("Restored {path}", path: path.as_str());
        Ok(metadata.into())
    }
}
