// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! A Dropbox account as a navigable, hierarchical drive
//!
//! [`FilesystemAdapter`] implements the navigation verbs a shell host
//! invokes (existence, listing, copy, move, remove, create, wildcard
//! expansion) over any [`RemoteStore`]. Reads are served from a
//! time-windowed [`MetadataCache`]; mutations clear it.

pub mod adapter;
pub mod cache;
pub mod error;
pub mod item_type;
pub mod memory;
pub mod metadata;
pub mod path;
pub mod provider;
pub mod remote;
pub mod secrets;
pub mod session;
pub mod translate;
pub mod wildcard;

mod transfer;

pub use adapter::{DEFAULT_REVISION_LIMIT, FilesystemAdapter, listing_order};
pub use cache::{CacheConfig, CacheStats, DEFAULT_REFRESH_WINDOW, MetadataCache};
pub use error::{Error, ErrorId, Result};
pub use item_type::ItemType;
pub use memory::MemoryStore;
pub use metadata::{ItemMetadata, ProviderItem, ROOT_TAG, RevisionEntry};
pub use path::{is_valid_path, normalize};
pub use provider::{
    Capability, DROPBOX, ProviderInfo, provider_by_name, providers, providers_with,
};
pub use remote::{ByteStream, RemoteError, RemoteErrorKind, RemoteResult, RemoteStore};
pub use secrets::{FileSecretStore, MAX_SECRET_BYTES, MemorySecretStore, SecretStore};
pub use session::{Connector, DriveSession, DriveSpec, remove_credentials, store_credentials};
pub use wildcard::WildcardPattern;

#[cfg(test)]
mod tests;
