// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::remote::RemoteErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Terminating errors surfaced to the host
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("There are currently no drives created for this provider")]
    NoDriveAssociatedWithProvider,

    #[error(
        "The type '{0}' is not a known type for the file system. Only \"file\" and \"directory\" can be specified"
    )]
    ItemTypeNotValid(String),

    #[error("Invalid path: '{0}'")]
    InvalidPath(String),

    #[error("Remote {kind} error: {message}")]
    Remote {
        kind: RemoteErrorKind,
        message: String,
    },

    #[error("Secret store error: {0}")]
    Secret(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error identifier reported alongside a terminating error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorId {
    NoDriveAssociatedWithProvider,
    ItemTypeNotValid,
    InvalidPath,
    /// The remote store's own category
    Remote(RemoteErrorKind),
    Secret,
    Io,
}

impl Error {
    pub fn item_type_not_valid<S: AsRef<str>>(s: S) -> Self {
        Error::ItemTypeNotValid(s.as_ref().to_string())
    }

    pub fn invalid_path<S: AsRef<str>>(s: S) -> Self {
        Error::InvalidPath(s.as_ref().to_string())
    }

    pub fn secret<S: AsRef<str>>(s: S) -> Self {
        Error::Secret(s.as_ref().to_string())
    }

    #[must_use]
    pub fn error_id(&self) -> ErrorId {
        match self {
            Error::NoDriveAssociatedWithProvider => ErrorId::NoDriveAssociatedWithProvider,
            Error::ItemTypeNotValid(_) => ErrorId::ItemTypeNotValid,
            Error::InvalidPath(_) => ErrorId::InvalidPath,
            Error::Remote { kind, .. } => ErrorId::Remote(*kind),
            Error::Secret(_) => ErrorId::Secret,
            Error::Io(_) => ErrorId::Io,
        }
    }

    /// Validation and session errors are raised before any remote call
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::ItemTypeNotValid(_)
                | Error::InvalidPath(_)
                | Error::NoDriveAssociatedWithProvider
        )
    }
}
