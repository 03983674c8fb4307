// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The remote store seen from the filesystem layer
//!
//! Every operation addresses items by canonical path (the root is `""`)
//! and fails with a classified [`RemoteError`]. Implementations do not
//! retry and do not enforce timeouts beyond their own transport.

use crate::metadata::{ItemMetadata, RevisionEntry};
use async_trait::async_trait;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Byte stream used for uploads and downloads
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Failure classification reported by the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    NotFound,
    Conflict,
    Unauthorized,
    RateLimited,
    Transient,
    Transport,
    BadRequest,
    Other,
}

impl std::fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RemoteErrorKind::NotFound => "NotFound",
            RemoteErrorKind::Conflict => "Conflict",
            RemoteErrorKind::Unauthorized => "Unauthorized",
            RemoteErrorKind::RateLimited => "RateLimited",
            RemoteErrorKind::Transient => "Transient",
            RemoteErrorKind::Transport => "Transport",
            RemoteErrorKind::BadRequest => "BadRequest",
            RemoteErrorKind::Other => "Other",
        };
        f.write_str(s)
    }
}

/// A failure from the remote store
///
/// Client layers may wrap failures (for example when several awaited
/// calls fail together); [`RemoteError::root_cause`] peels that wrapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("{kind}: {message}")]
    Failure {
        kind: RemoteErrorKind,
        message: String,
    },

    #[error("{} remote failure(s)", .0.len())]
    Aggregate(Vec<RemoteError>),
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        RemoteError::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(RemoteErrorKind::NotFound, format!("path/not_found: {path}"))
    }

    pub fn conflict(path: &str) -> Self {
        Self::new(RemoteErrorKind::Conflict, format!("path/conflict: {path}"))
    }

    /// Unwrap aggregation down to a single failure
    ///
    /// The first failure of an aggregate is its root cause; an empty
    /// aggregate is an `Other` failure.
    #[must_use]
    pub fn root_cause(self) -> RemoteError {
        match self {
            RemoteError::Aggregate(errors) => match errors.into_iter().next() {
                Some(first) => first.root_cause(),
                None => Self::new(RemoteErrorKind::Other, "empty aggregate failure"),
            },
            failure => failure,
        }
    }

    /// Classification of the root cause
    #[must_use]
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteError::Failure { kind, .. } => *kind,
            RemoteError::Aggregate(errors) => errors
                .first()
                .map(RemoteError::kind)
                .unwrap_or(RemoteErrorKind::Other),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == RemoteErrorKind::NotFound
    }
}

/// Operations consumed from the remote store client
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get_metadata(&self, path: &str) -> RemoteResult<ItemMetadata>;

    /// Immediate children of a folder, in remote order
    async fn list_children(&self, path: &str) -> RemoteResult<Vec<ItemMetadata>>;

    async fn upload(&self, path: &str, content: ByteStream) -> RemoteResult<ItemMetadata>;

    async fn download(&self, path: &str) -> RemoteResult<ByteStream>;

    async fn copy(&self, from: &str, to: &str) -> RemoteResult<ItemMetadata>;

    async fn move_item(&self, from: &str, to: &str) -> RemoteResult<ItemMetadata>;

    async fn delete(&self, path: &str) -> RemoteResult<ItemMetadata>;

    async fn create_folder(&self, path: &str) -> RemoteResult<ItemMetadata>;

    async fn list_revisions(&self, path: &str, limit: u64) -> RemoteResult<Vec<RevisionEntry>>;

    async fn restore_revision(&self, path: &str, revision: &str) -> RemoteResult<ItemMetadata>;
}
