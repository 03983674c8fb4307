// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use dropfs::{RemoteError, RemoteErrorKind};

pub type Result<T> = std::result::Result<T, DropboxError>;

/// Failures talking to the Dropbox HTTP API
#[derive(Debug, thiserror::Error)]
pub enum DropboxError {
    /// Non-success status; `summary` is the API's `error_summary` when the
    /// body carried one, otherwise the raw body
    #[error("HTTP {status} from {endpoint}: {summary}")]
    Api {
        status: u16,
        endpoint: String,
        summary: String,
    },

    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DropboxError {
    /// Classify into the filesystem layer's error kinds
    #[must_use]
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            DropboxError::Api {
                status, summary, ..
            } => classify(*status, summary),
            DropboxError::Transport { source, .. } if source.is_timeout() => {
                RemoteErrorKind::Transient
            }
            DropboxError::Transport { .. } => RemoteErrorKind::Transport,
            DropboxError::Decode { .. } => RemoteErrorKind::Other,
            DropboxError::InvalidRequest(_) => RemoteErrorKind::BadRequest,
        }
    }
}

/// Map an HTTP status and Dropbox `error_summary` onto an error kind
///
/// Endpoint-specific failures arrive as 409 with a summary such as
/// `path/not_found/..` or `to/conflict/file/..`.
#[must_use]
pub fn classify(status: u16, summary: &str) -> RemoteErrorKind {
    match status {
        400 => RemoteErrorKind::BadRequest,
        401 => RemoteErrorKind::Unauthorized,
        403 => RemoteErrorKind::Unauthorized,
        409 => classify_summary(summary),
        429 => RemoteErrorKind::RateLimited,
        500..=599 => RemoteErrorKind::Transient,
        _ => RemoteErrorKind::Other,
    }
}

fn classify_summary(summary: &str) -> RemoteErrorKind {
    let tags: Vec<&str> = summary.split('/').map(str::trim).collect();
    let has = |tag: &str| tags.iter().any(|t| *t == tag);

    if has("not_found") || has("invalid_revision") {
        RemoteErrorKind::NotFound
    } else if has("conflict") {
        RemoteErrorKind::Conflict
    } else if has("too_many_write_operations") || has("too_many_files") {
        RemoteErrorKind::RateLimited
    } else if has("malformed_path")
        || has("not_folder")
        || has("not_file")
        || has("disallowed_name")
        || has("duplicated_or_nested_paths")
        || has("cant_move_folder_into_itself")
    {
        RemoteErrorKind::BadRequest
    } else if has("no_write_permission") || has("restricted_content") {
        RemoteErrorKind::Unauthorized
    } else {
        RemoteErrorKind::Other
    }
}

impl From<DropboxError> for RemoteError {
    fn from(err: DropboxError) -> Self {
        RemoteError::new(err.kind(), err.to_string())
    }
}
