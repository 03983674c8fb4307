// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory remote store
//!
//! Behaves like the hosted store in the ways the filesystem layer cares
//! about: case-insensitive paths that keep their display case, tombstones
//! for deleted files, conflicts on existing targets, per-file revision
//! history. Every trait call is counted, and a failure can be scripted for
//! the next call of any operation.

use crate::metadata::{ItemMetadata, RevisionEntry};
use crate::path::{cache_key, is_root, join, normalize, split_path};
use crate::remote::{ByteStream, RemoteError, RemoteErrorKind, RemoteResult, RemoteStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::io::AsyncReadExt;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct Revision {
    id: String,
    content: Vec<u8>,
    modified: DateTime<Utc>,
}

#[derive(Debug, Clone)]
enum Node {
    Folder {
        path: String,
    },
    File {
        path: String,
        revisions: Vec<Revision>,
    },
    Tombstone {
        path: String,
    },
}

impl Node {
    fn path(&self) -> &str {
        match self {
            Node::Folder { path } | Node::File { path, .. } | Node::Tombstone { path } => path,
        }
    }

    fn is_live(&self) -> bool {
        !matches!(self, Node::Tombstone { .. })
    }

    fn metadata(&self) -> ItemMetadata {
        match self {
            Node::Folder { path } => ItemMetadata::folder(path.clone()),
            Node::File { path, revisions } => match revisions.last() {
                Some(current) => {
                    ItemMetadata::file(path.clone(), current.content.len() as u64, current.modified)
                }
                None => ItemMetadata::file(path.clone(), 0, Utc::now()),
            },
            Node::Tombstone { path } => ItemMetadata::deleted(path.clone()),
        }
    }

    fn with_path(&self, path: String) -> Node {
        match self {
            Node::Folder { .. } => Node::Folder { path },
            Node::File { revisions, .. } => Node::File {
                path,
                revisions: revisions.clone(),
            },
            Node::Tombstone { .. } => Node::Tombstone { path },
        }
    }
}

#[derive(Default)]
struct State {
    /// Keyed by case-folded canonical path; the root is implicit
    nodes: BTreeMap<String, Node>,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, Vec<RemoteError>>,
    /// Revision history of deleted files, by key
    deleted_history: HashMap<String, Vec<Revision>>,
    next_revision: u64,
}

impl State {
    fn record(&mut self, op: &'static str) -> RemoteResult<()> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.get_mut(op).and_then(Vec::pop) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn live(&self, path: &str) -> Option<&Node> {
        self.nodes.get(&cache_key(path)).filter(|n| n.is_live())
    }

    fn is_folder(&self, path: &str) -> bool {
        is_root(path) || matches!(self.live(path), Some(Node::Folder { .. }))
    }

    /// Live entries at or below `path`, as (key, node)
    fn subtree(&self, path: &str) -> Vec<(String, Node)> {
        let key = cache_key(path);
        let prefix = format!("{key}/");
        self.nodes
            .iter()
            .filter(|(k, n)| n.is_live() && (**k == key || k.starts_with(&prefix)))
            .map(|(k, n)| (k.clone(), n.clone()))
            .collect()
    }

    /// Create missing ancestor folders of `path`
    fn ensure_parents(&mut self, path: &str) -> RemoteResult<()> {
        let (parent, _) = split_path(path);
        if is_root(parent) {
            return Ok(());
        }
        match self.live(parent) {
            Some(Node::Folder { .. }) => Ok(()),
            Some(_) => Err(RemoteError::new(
                RemoteErrorKind::Conflict,
                format!("path/conflict/file: {parent}"),
            )),
            None => {
                self.ensure_parents(parent)?;
                _ = self.nodes.insert(
                    cache_key(parent),
                    Node::Folder {
                        path: parent.to_string(),
                    },
                );
                Ok(())
            }
        }
    }

    fn revision(&mut self, content: Vec<u8>) -> Revision {
        self.next_revision += 1;
        Revision {
            id: format!("{:09x}", self.next_revision),
            content,
            modified: Utc::now(),
        }
    }

    fn transplant(
        &mut self,
        from: &str,
        to: &str,
        remove_source: bool,
    ) -> RemoteResult<ItemMetadata> {
        let from = normalize(from);
        let to = normalize(to);
        if is_root(&from) || is_root(&to) {
            return Err(RemoteError::new(RemoteErrorKind::BadRequest, "path/malformed_path"));
        }
        if self.live(&from).is_none() {
            return Err(RemoteError::not_found(&from));
        }
        if self.live(&to).is_some() {
            return Err(RemoteError::conflict(&to));
        }
        let from_key = cache_key(&from);
        if cache_key(&to).starts_with(&format!("{from_key}/")) {
            return Err(RemoteError::new(
                RemoteErrorKind::BadRequest,
                "duplicated_or_nested_paths",
            ));
        }
        self.ensure_parents(&to)?;

        // Stored and requested paths may differ in case, so re-root by
        // component rather than by byte offset
        let depth = from.split('/').count();
        let moved = self.subtree(&from);
        for (key, node) in moved {
            let target = node
                .path()
                .split('/')
                .skip(depth)
                .fold(to.clone(), |acc, segment| join(&acc, segment));
            if remove_source {
                _ = self.nodes.insert(key, Node::Tombstone { path: node.path().to_string() });
            }
            _ = self.nodes.insert(cache_key(&target), node.with_path(target));
        }

        self.live(&to)
            .map(Node::metadata)
            .ok_or_else(|| RemoteError::not_found(&to))
    }
}

/// Remote store kept entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `op` was called through the trait
    pub async fn calls(&self, op: &str) -> usize {
        self.state.lock().await.calls.get(op).copied().unwrap_or(0)
    }

    pub async fn total_calls(&self) -> usize {
        self.state.lock().await.calls.values().sum()
    }

    /// Make the next call of `op` fail with `err`
    pub async fn fail_next(&self, op: &'static str, err: RemoteError) {
        self.state
            .lock()
            .await
            .failures
            .entry(op)
            .or_default()
            .insert(0, err);
    }

    /// Add a file without counting a call
    pub async fn seed_file(&self, path: &str, content: &[u8]) {
        let path = normalize(path);
        let mut state = self.state.lock().await;
        _ = state.ensure_parents(&path);
        let revision = state.revision(content.to_vec());
        _ = state.nodes.insert(
            cache_key(&path),
            Node::File {
                path,
                revisions: vec![revision],
            },
        );
    }

    /// Add a folder (and its ancestors) without counting a call
    pub async fn seed_folder(&self, path: &str) {
        let path = normalize(path);
        let mut state = self.state.lock().await;
        _ = state.ensure_parents(&path);
        _ = state.nodes.insert(cache_key(&path), Node::Folder { path });
    }

    /// Leave a tombstone, as the hosted store does for deleted files
    pub async fn insert_tombstone(&self, path: &str) {
        let path = normalize(path);
        let mut state = self.state.lock().await;
        _ = state.ensure_parents(&path);
        _ = state.nodes.insert(cache_key(&path), Node::Tombstone { path });
    }

    /// Current content of a file, bypassing the call counters
    pub async fn content(&self, path: &str) -> Option<Vec<u8>> {
        match self.state.lock().await.live(&normalize(path)) {
            Some(Node::File { revisions, .. }) => revisions.last().map(|r| r.content.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get_metadata(&self, path: &str) -> RemoteResult<ItemMetadata> {
        let mut state = self.state.lock().await;
        state.record("get_metadata")?;
        let path = normalize(path);
        if is_root(&path) {
            return Err(RemoteError::new(
                RemoteErrorKind::BadRequest,
                "The root folder is unsupported",
            ));
        }
        state
            .nodes
            .get(&cache_key(&path))
            .map(Node::metadata)
            .ok_or_else(|| RemoteError::not_found(&path))
    }

    async fn list_children(&self, path: &str) -> RemoteResult<Vec<ItemMetadata>> {
        let mut state = self.state.lock().await;
        state.record("list_children")?;
        let path = normalize(path);
        if !is_root(&path) {
            match state.live(&path) {
                Some(Node::Folder { .. }) => {}
                Some(_) => {
                    return Err(RemoteError::new(
                        RemoteErrorKind::BadRequest,
                        format!("path/not_folder: {path}"),
                    ));
                }
                None => return Err(RemoteError::not_found(&path)),
            }
        }
        let parent = cache_key(&path);
        Ok(state
            .nodes
            .iter()
            .filter(|(key, _)| split_path(key).0 == parent)
            .map(|(_, node)| node.metadata())
            .collect())
    }

    async fn upload(&self, path: &str, mut content: ByteStream) -> RemoteResult<ItemMetadata> {
        let mut bytes = Vec::new();
        let read = content.read_to_end(&mut bytes).await;

        let mut state = self.state.lock().await;
        state.record("upload")?;
        _ = read.map_err(|e| RemoteError::new(RemoteErrorKind::Transport, e.to_string()))?;

        let path = normalize(path);
        if is_root(&path) || state.is_folder(&path) {
            return Err(RemoteError::new(
                RemoteErrorKind::BadRequest,
                format!("path/malformed_path: {path}"),
            ));
        }
        if state.live(&path).is_some() {
            return Err(RemoteError::conflict(&path));
        }
        state.ensure_parents(&path)?;

        let revision = state.revision(bytes);
        let key = cache_key(&path);
        // A re-created file keeps the history of its earlier life
        let mut revisions = state.deleted_history.remove(&key).unwrap_or_default();
        revisions.push(revision);
        let node = Node::File { path, revisions };
        let metadata = node.metadata();
        _ = state.nodes.insert(key, node);
        Ok(metadata)
    }

    async fn download(&self, path: &str) -> RemoteResult<ByteStream> {
        let mut state = self.state.lock().await;
        state.record("download")?;
        let path = normalize(path);
        match state.live(&path) {
            Some(Node::File { revisions, .. }) => {
                let bytes = revisions.last().map(|r| r.content.clone()).unwrap_or_default();
                Ok(Box::pin(std::io::Cursor::new(bytes)))
            }
            Some(_) => Err(RemoteError::new(
                RemoteErrorKind::BadRequest,
                format!("path/not_file: {path}"),
            )),
            None => Err(RemoteError::not_found(&path)),
        }
    }

    async fn copy(&self, from: &str, to: &str) -> RemoteResult<ItemMetadata> {
        let mut state = self.state.lock().await;
        state.record("copy")?;
        state.transplant(from, to, false)
    }

    async fn move_item(&self, from: &str, to: &str) -> RemoteResult<ItemMetadata> {
        let mut state = self.state.lock().await;
        state.record("move")?;
        state.transplant(from, to, true)
    }

    async fn delete(&self, path: &str) -> RemoteResult<ItemMetadata> {
        let mut state = self.state.lock().await;
        state.record("delete")?;
        let path = normalize(path);
        let metadata = state
            .live(&path)
            .map(Node::metadata)
            .ok_or_else(|| RemoteError::not_found(&path))?;

        for (key, node) in state.subtree(&path) {
            let display = node.path().to_string();
            if let Node::File { revisions, .. } = node {
                // History survives deletion so the file can be restored
                _ = state.deleted_history.insert(key.clone(), revisions);
            }
            _ = state.nodes.insert(key, Node::Tombstone { path: display });
        }
        Ok(metadata)
    }

    async fn create_folder(&self, path: &str) -> RemoteResult<ItemMetadata> {
        let mut state = self.state.lock().await;
        state.record("create_folder")?;
        let path = normalize(path);
        if is_root(&path) {
            return Err(RemoteError::new(RemoteErrorKind::BadRequest, "path/malformed_path"));
        }
        if state.live(&path).is_some() {
            return Err(RemoteError::conflict(&path));
        }
        state.ensure_parents(&path)?;
        let node = Node::Folder { path };
        let metadata = node.metadata();
        _ = state.nodes.insert(cache_key(node.path()), node);
        Ok(metadata)
    }

    async fn list_revisions(&self, path: &str, limit: u64) -> RemoteResult<Vec<RevisionEntry>> {
        let mut state = self.state.lock().await;
        state.record("list_revisions")?;
        let path = normalize(path);
        let key = cache_key(&path);
        let revisions = match (state.nodes.get(&key), state.deleted_history.get(&key)) {
            (Some(Node::File { revisions, .. }), _) => revisions,
            (Some(Node::Tombstone { .. }), Some(history)) => history,
            (Some(Node::Folder { .. }), _) => {
                return Err(RemoteError::new(
                    RemoteErrorKind::BadRequest,
                    format!("path/not_file: {path}"),
                ));
            }
            _ => return Err(RemoteError::not_found(&path)),
        };
        Ok(revisions
            .iter()
            .rev()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|r| RevisionEntry {
                revision_id: r.id.clone(),
                server_modified: r.modified,
                client_modified: r.modified,
            })
            .collect())
    }

    async fn restore_revision(&self, path: &str, revision: &str) -> RemoteResult<ItemMetadata> {
        let mut state = self.state.lock().await;
        state.record("restore_revision")?;
        let path = normalize(path);
        let key = cache_key(&path);

        let mut history = match state.nodes.get(&key) {
            Some(Node::File { revisions, .. }) => revisions.clone(),
            Some(Node::Tombstone { .. }) => state.deleted_history.remove(&key).unwrap_or_default(),
            Some(Node::Folder { .. }) => {
                return Err(RemoteError::new(
                    RemoteErrorKind::BadRequest,
                    format!("path/not_file: {path}"),
                ));
            }
            None => return Err(RemoteError::not_found(&path)),
        };

        let content = history
            .iter()
            .find(|r| r.id == revision)
            .map(|r| r.content.clone())
            .ok_or_else(|| {
                RemoteError::new(RemoteErrorKind::NotFound, format!("invalid_revision: {revision}"))
            })?;

        let restored = state.revision(content);
        history.push(restored);
        let display = state
            .nodes
            .get(&key)
            .map(|n| n.path().to_string())
            .unwrap_or(path);
        let node = Node::File {
            path: display,
            revisions: history,
        };
        let metadata = node.metadata();
        _ = state.nodes.insert(key, node);
        Ok(metadata)
    }
}
