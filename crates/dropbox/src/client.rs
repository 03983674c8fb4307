// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{DropboxError, Result};
use crate::models::{
    Account, ApiErrorBody, CreateFolderArg, FileMetadata, FolderResult, GetMetadataArg,
    ListFolderArg, ListFolderContinueArg, ListFolderResult, ListRevisionsArg, ListRevisionsResult,
    Metadata, MetadataResult, PathArg, RelocationArg, RestoreArg, UploadArg,
};
use async_trait::async_trait;
use diagnostics::*;
use dropfs::{
    ByteStream, ItemMetadata, RemoteError, RemoteErrorKind, RemoteResult, RemoteStore,
    RevisionEntry,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use url::Url;

pub const API_BASE_URL: &str = "https://api.dropboxapi.com/2/";
pub const CONTENT_BASE_URL: &str = "https://content.dropboxapi.com/2/";
const TIMEOUT_SECONDS: u64 = 60;
const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// The API caps a single revision listing at 100 entries
pub const MAX_REVISIONS: u64 = 100;

/// Async Dropbox API client
pub struct DropboxClient {
    http_client: reqwest::Client,
    token: String,
    api_base: Url,
    content_base: Url,
}

impl DropboxClient {
    /// Create a client for the hosted API
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_urls(token, API_BASE_URL, CONTENT_BASE_URL)
    }

    /// Create a client against other endpoints (tests, proxies)
    pub fn with_base_urls(
        token: impl Into<String>,
        api_base: &str,
        content_base: &str,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .build()
            .map_err(|source| DropboxError::Transport {
                endpoint: "client".to_string(),
                source,
            })?;

        Ok(DropboxClient {
            http_client,
            token: token.into(),
            api_base: Self::parse_base(api_base)?,
            content_base: Self::parse_base(content_base)?,
        })
    }

    fn parse_base(base: &str) -> Result<Url> {
        // Url::join drops the last segment unless the base ends with '/'
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        Url::parse(&base).map_err(|e| DropboxError::InvalidRequest(format!("bad base URL {base}: {e}")))
    }

    fn endpoint_url(base: &Url, endpoint: &str) -> Result<Url> {
        base.join(endpoint)
            .map_err(|e| DropboxError::InvalidRequest(format!("bad endpoint {endpoint}: {e}")))
    }

    /// Who the token belongs to; also serves as an authentication check
    pub async fn current_account(&self) -> Result<Account> {
        self.rpc("users/get_current_account", &()).await
    }

    /// JSON-in, JSON-out call on the RPC host
    async fn rpc<A, R>(&self, endpoint: &str, arg: &A) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = Self::endpoint_url(&self.api_base, endpoint)?;
        debug!("Dropbox RPC {endpoint}", endpoint: endpoint);

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.token)
            .json(arg)
            .send()
            .await
            .map_err(|source| DropboxError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let body = Self::success_body(endpoint, response).await?;
        serde_json::from_slice(&body).map_err(|source| DropboxError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// Upload call on the content host; the argument travels in a header
    async fn content_upload<R>(
        &self,
        endpoint: &str,
        arg: &impl Serialize,
        body: Vec<u8>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = Self::endpoint_url(&self.content_base, endpoint)?;
        debug!("Dropbox upload {endpoint} ({bytes} bytes)", endpoint: endpoint, bytes: body.len());

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.token)
            .header(API_ARG_HEADER, api_arg_header(arg)?)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(|source| DropboxError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let body = Self::success_body(endpoint, response).await?;
        serde_json::from_slice(&body).map_err(|source| DropboxError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// Download call on the content host; returns the raw content
    async fn content_download(&self, endpoint: &str, arg: &impl Serialize) -> Result<bytes::Bytes> {
        let url = Self::endpoint_url(&self.content_base, endpoint)?;
        debug!("Dropbox download {endpoint}", endpoint: endpoint);

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.token)
            .header(API_ARG_HEADER, api_arg_header(arg)?)
            .send()
            .await
            .map_err(|source| DropboxError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        Self::success_body(endpoint, response).await
    }

    async fn success_body(endpoint: &str, response: reqwest::Response) -> Result<bytes::Bytes> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| DropboxError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        if status.is_success() {
            return Ok(body);
        }

        let summary = match serde_json::from_slice::<ApiErrorBody>(&body) {
            Ok(parsed) => parsed.error_summary,
            Err(_) => String::from_utf8_lossy(&body).trim().to_string(),
        };
        let summary_str = summary.as_str();
        warn!("Dropbox {endpoint} returned {status}: {summary}", endpoint: endpoint, status: status.as_u16(), summary: summary_str);

        Err(DropboxError::Api {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
            summary,
        })
    }

    /// All pages of a folder listing
    pub async fn list_folder(&self, path: &str) -> Result<Vec<Metadata>> {
        let mut page: ListFolderResult = self
            .rpc(
                "files/list_folder",
                &ListFolderArg {
                    path: api_path(path),
                    recursive: false,
                    include_deleted: false,
                },
            )
            .await?;

        let mut entries = std::mem::take(&mut page.entries);
        while page.has_more {
            let cursor = std::mem::take(&mut page.cursor);
            page = self
                .rpc(
                    "files/list_folder/continue",
                    &ListFolderContinueArg { cursor: &cursor },
                )
                .await?;
            entries.append(&mut page.entries);
        }
        Ok(entries)
    }
}

/// The API spells the root as the empty string
fn api_path(path: &str) -> &str {
    if path == "/" { "" } else { path }
}

/// Encode an argument for the `Dropbox-API-Arg` header
///
/// HTTP headers must be ASCII, so every non-ASCII character is written as
/// a JSON `\uXXXX` escape (surrogate pairs above the BMP).
pub fn api_arg_header(arg: &impl Serialize) -> Result<String> {
    let json = serde_json::to_string(arg).map_err(|source| DropboxError::Decode {
        endpoint: API_ARG_HEADER.to_string(),
        source,
    })?;

    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    Ok(out)
}

#[async_trait]
impl RemoteStore for DropboxClient {
    async fn get_metadata(&self, path: &str) -> RemoteResult<ItemMetadata> {
        let metadata: Metadata = self
            .rpc(
                "files/get_metadata",
                &GetMetadataArg {
                    path: api_path(path),
                    include_deleted: true,
                },
            )
            .await?;
        Ok(metadata.into())
    }

    async fn list_children(&self, path: &str) -> RemoteResult<Vec<ItemMetadata>> {
        Ok(self
            .list_folder(path)
            .await?
            .into_iter()
            .map(ItemMetadata::from)
            .collect())
    }

    async fn upload(&self, path: &str, mut content: ByteStream) -> RemoteResult<ItemMetadata> {
        let mut body = Vec::new();
        _ = content
            .read_to_end(&mut body)
            .await
            .map_err(|e| RemoteError::new(RemoteErrorKind::Transport, e.to_string()))?;

        let metadata: FileMetadata = self
            .content_upload(
                "files/upload",
                &UploadArg {
                    path,
                    mode: "add",
                    autorename: false,
                    mute: false,
                },
                body,
            )
            .await?;
        Ok(metadata.into())
    }

    async fn download(&self, path: &str) -> RemoteResult<ByteStream> {
        let content = self
            .content_download("files/download", &PathArg { path })
            .await?;
        Ok(Box::pin(std::io::Cursor::new(content)))
    }

    async fn copy(&self, from: &str, to: &str) -> RemoteResult<ItemMetadata> {
        let result: MetadataResult = self
            .rpc(
                "files/copy_v2",
                &RelocationArg {
                    from_path: from,
                    to_path: to,
                    autorename: false,
                },
            )
            .await?;
        Ok(result.metadata.into())
    }

    async fn move_item(&self, from: &str, to: &str) -> RemoteResult<ItemMetadata> {
        let result: MetadataResult = self
            .rpc(
                "files/move_v2",
                &RelocationArg {
                    from_path: from,
                    to_path: to,
                    autorename: false,
                },
            )
            .await?;
        Ok(result.metadata.into())
    }

    async fn delete(&self, path: &str) -> RemoteResult<ItemMetadata> {
        let result: MetadataResult = self.rpc("files/delete_v2", &PathArg { path }).await?;
        Ok(result.metadata.into())
    }

    async fn create_folder(&self, path: &str) -> RemoteResult<ItemMetadata> {
        let result: FolderResult = self
            .rpc(
                "files/create_folder_v2",
                &CreateFolderArg {
                    path,
                    autorename: false,
                },
            )
            .await?;
        Ok(result.metadata.into())
    }

    async fn list_revisions(&self, path: &str, limit: u64) -> RemoteResult<Vec<RevisionEntry>> {
        let result: ListRevisionsResult = self
            .rpc(
                "files/list_revisions",
                &ListRevisionsArg {
                    path,
                    mode: "path",
                    limit: limit.min(MAX_REVISIONS),
                },
            )
            .await?;
        Ok(result.entries.into_iter().map(RevisionEntry::from).collect())
    }

    async fn restore_revision(&self, path: &str, revision: &str) -> RemoteResult<ItemMetadata> {
        let metadata: FileMetadata = self
            .rpc("files/restore", &RestoreArg { path, rev: revision })
            .await?;
        Ok(metadata.into())
    }
}
