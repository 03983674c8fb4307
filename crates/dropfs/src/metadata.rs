// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider tag carried by every item
pub const ROOT_TAG: &str = "dropbox";

/// One remote filesystem entry as reported by the remote store
///
/// Items are immutable once built; a fresh fetch produces a new value.
/// Folders never carry `size` or `server_modified`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Leaf component
    pub name: String,

    /// Full path as the remote store displays it (may differ in case from
    /// the path that was requested)
    pub path: String,

    pub is_folder: bool,

    /// Tombstone marker; deleted items are never surfaced as existing
    pub is_deleted: bool,

    /// Size in bytes, files only
    pub size: Option<u64>,

    /// Last server-side modification, files only
    pub server_modified: Option<DateTime<Utc>>,

    pub root: String,
}

impl ItemMetadata {
    /// Metadata for a file
    #[must_use]
    pub fn file(path: impl Into<String>, size: u64, server_modified: DateTime<Utc>) -> Self {
        let path = path.into();
        Self {
            name: leaf_name(&path),
            path,
            is_folder: false,
            is_deleted: false,
            size: Some(size),
            server_modified: Some(server_modified),
            root: ROOT_TAG.to_string(),
        }
    }

    /// Metadata for a folder
    #[must_use]
    pub fn folder(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: leaf_name(&path),
            path,
            is_folder: true,
            is_deleted: false,
            size: None,
            server_modified: None,
            root: ROOT_TAG.to_string(),
        }
    }

    /// Tombstone for an entry the remote store still reports after deletion
    #[must_use]
    pub fn deleted(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: leaf_name(&path),
            path,
            is_folder: false,
            is_deleted: true,
            size: None,
            server_modified: None,
            root: ROOT_TAG.to_string(),
        }
    }
}

fn leaf_name(path: &str) -> String {
    crate::path::split_path(path).1.to_string()
}

/// An item as handed back to the host, tagged with the path and container
/// flag the host should associate with it
///
/// For copy and move the tag is the destination path rather than the
/// metadata's own path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderItem {
    pub metadata: ItemMetadata,
    pub path: String,
    pub is_container: bool,
}

impl ProviderItem {
    #[must_use]
    pub fn tagged(metadata: ItemMetadata, path: impl Into<String>, is_container: bool) -> Self {
        Self {
            metadata,
            path: path.into(),
            is_container,
        }
    }
}

impl From<ItemMetadata> for ProviderItem {
    fn from(metadata: ItemMetadata) -> Self {
        let path = metadata.path.clone();
        let is_container = metadata.is_folder;
        Self {
            metadata,
            path,
            is_container,
        }
    }
}

/// One entry of a file's revision history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionEntry {
    pub revision_id: String,
    pub server_modified: DateTime<Utc>,
    pub client_modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_and_folder_are_exclusive() {
        let file = ItemMetadata::file("/docs/a.txt", 12, Utc::now());
        assert_eq!(file.name, "a.txt");
        assert!(!file.is_folder);
        assert_eq!(file.size, Some(12));

        let folder = ItemMetadata::folder("/docs");
        assert_eq!(folder.name, "docs");
        assert!(folder.is_folder);
        assert!(folder.size.is_none());
        assert!(folder.server_modified.is_none());
        assert_eq!(folder.root, ROOT_TAG);
    }

    #[test]
    fn test_provider_item_defaults_to_own_path() {
        let item: ProviderItem = ItemMetadata::folder("/Docs").into();
        assert_eq!(item.path, "/Docs");
        assert!(item.is_container);

        let tagged = ProviderItem::tagged(ItemMetadata::folder("/Docs"), "/copy", false);
        assert_eq!(tagged.path, "/copy");
        assert!(!tagged.is_container);
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(ItemMetadata::folder("/x")).unwrap();
        assert_eq!(json["is_folder"], true);
        assert_eq!(json["root"], "dropbox");
    }
}
