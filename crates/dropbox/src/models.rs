// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Wire types of the Dropbox v2 API

use chrono::{DateTime, Utc};
use dropfs::{ItemMetadata, ROOT_TAG, RevisionEntry};
use serde::{Deserialize, Serialize};

/// File, folder or tombstone entry
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum Metadata {
    File(FileMetadata),
    Folder(FolderMetadata),
    Deleted(DeletedMetadata),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileMetadata {
    pub name: String,
    pub path_display: Option<String>,
    pub path_lower: Option<String>,
    pub id: Option<String>,
    pub rev: String,
    pub size: u64,
    pub client_modified: DateTime<Utc>,
    pub server_modified: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FolderMetadata {
    pub name: String,
    pub path_display: Option<String>,
    pub path_lower: Option<String>,
    pub id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeletedMetadata {
    pub name: String,
    pub path_display: Option<String>,
    pub path_lower: Option<String>,
}

/// Display path, falling back to the lower-cased one and then the name
fn display_path(name: &str, display: Option<&String>, lower: Option<&String>) -> String {
    display
        .or(lower)
        .cloned()
        .unwrap_or_else(|| format!("/{name}"))
}

impl From<FileMetadata> for ItemMetadata {
    fn from(file: FileMetadata) -> Self {
        ItemMetadata {
            path: display_path(&file.name, file.path_display.as_ref(), file.path_lower.as_ref()),
            name: file.name,
            is_folder: false,
            is_deleted: false,
            size: Some(file.size),
            server_modified: Some(file.server_modified),
            root: ROOT_TAG.to_string(),
        }
    }
}

impl From<FolderMetadata> for ItemMetadata {
    fn from(folder: FolderMetadata) -> Self {
        ItemMetadata {
            path: display_path(
                &folder.name,
                folder.path_display.as_ref(),
                folder.path_lower.as_ref(),
            ),
            name: folder.name,
            is_folder: true,
            is_deleted: false,
            size: None,
            server_modified: None,
            root: ROOT_TAG.to_string(),
        }
    }
}

impl From<Metadata> for ItemMetadata {
    fn from(metadata: Metadata) -> Self {
        match metadata {
            Metadata::File(file) => file.into(),
            Metadata::Folder(folder) => folder.into(),
            Metadata::Deleted(deleted) => ItemMetadata {
                path: display_path(
                    &deleted.name,
                    deleted.path_display.as_ref(),
                    deleted.path_lower.as_ref(),
                ),
                name: deleted.name,
                is_folder: false,
                is_deleted: true,
                size: None,
                server_modified: None,
                root: ROOT_TAG.to_string(),
            },
        }
    }
}

impl From<FileMetadata> for RevisionEntry {
    fn from(file: FileMetadata) -> Self {
        RevisionEntry {
            revision_id: file.rev,
            server_modified: file.server_modified,
            client_modified: file.client_modified,
        }
    }
}

/// `files/list_folder` and `files/list_folder/continue` result
#[derive(Serialize, Deserialize, Debug)]
pub struct ListFolderResult {
    pub entries: Vec<Metadata>,
    pub cursor: String,
    pub has_more: bool,
}

/// Result of the `*_v2` mutation endpoints
#[derive(Serialize, Deserialize, Debug)]
pub struct MetadataResult {
    pub metadata: Metadata,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FolderResult {
    pub metadata: FolderMetadata,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ListRevisionsResult {
    pub is_deleted: bool,
    pub entries: Vec<FileMetadata>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AccountName {
    pub display_name: String,
}

/// `users/get_current_account` result, trimmed to what we show
#[derive(Serialize, Deserialize, Debug)]
pub struct Account {
    pub account_id: String,
    pub email: String,
    pub name: AccountName,
}

/// Error body of a 409 response
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiErrorBody {
    pub error_summary: String,
}

// Request arguments

#[derive(Serialize, Debug)]
pub struct PathArg<'a> {
    pub path: &'a str,
}

#[derive(Serialize, Debug)]
pub struct GetMetadataArg<'a> {
    pub path: &'a str,
    pub include_deleted: bool,
}

#[derive(Serialize, Debug)]
pub struct ListFolderArg<'a> {
    pub path: &'a str,
    pub recursive: bool,
    pub include_deleted: bool,
}

#[derive(Serialize, Debug)]
pub struct ListFolderContinueArg<'a> {
    pub cursor: &'a str,
}

#[derive(Serialize, Debug)]
pub struct RelocationArg<'a> {
    pub from_path: &'a str,
    pub to_path: &'a str,
    pub autorename: bool,
}

#[derive(Serialize, Debug)]
pub struct CreateFolderArg<'a> {
    pub path: &'a str,
    pub autorename: bool,
}

#[derive(Serialize, Debug)]
pub struct ListRevisionsArg<'a> {
    pub path: &'a str,
    pub mode: &'static str,
    pub limit: u64,
}

#[derive(Serialize, Debug)]
pub struct RestoreArg<'a> {
    pub path: &'a str,
    pub rev: &'a str,
}

#[derive(Serialize, Debug)]
pub struct UploadArg<'a> {
    pub path: &'a str,
    /// Always `add`; existing files are never overwritten
    pub mode: &'static str,
    pub autorename: bool,
    pub mute: bool,
}
