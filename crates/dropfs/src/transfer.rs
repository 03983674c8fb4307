// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Copying between the mounted drive and the local filesystem

use crate::adapter::FilesystemAdapter;
use crate::error::{Error, Result};
use crate::metadata::ItemMetadata;
use crate::path::{is_root, join, normalize, split_path};
use crate::remote::{ByteStream, RemoteError};
use diagnostics::*;
use std::path::{Path, PathBuf};

impl FilesystemAdapter {
    /// Download a remote file or folder tree
    ///
    /// When `local` is an existing directory the item lands inside it under
    /// its own name. Folders are mirrored with all their descendants. Returns
    /// the local files written.
    pub async fn download_to_local(&self, remote: &str, local: &Path) -> Result<Vec<PathBuf>> {
        let remote = normalize(remote);
        debug!("Invoking download_to_local({remote})", remote: remote.as_str());

        let root_is_folder = is_root(&remote) || self.is_container(&remote).await?;
        let mut written = Vec::new();

        if !root_is_folder {
            let item = self
                .get_item(&remote)
                .await?
                .ok_or_else(|| Error::from(RemoteError::not_found(&remote)))?;
            let dest = if local.is_dir() {
                local.join(&item.metadata.name)
            } else {
                local.to_path_buf()
            };
            self.download_file(&remote, item.metadata.size, &dest).await?;
            written.push(dest);
            return Ok(written);
        }

        let base = if local.is_dir() && !is_root(&remote) {
            local.join(split_path(&remote).1)
        } else {
            local.to_path_buf()
        };
        tokio::fs::create_dir_all(&base).await?;

        for child in self.get_children(&remote, true).await? {
            let child_path = normalize(&child.metadata.path);
            let relative = child_path
                .get(remote.len()..)
                .map(|rest| rest.trim_start_matches('/'))
                .ok_or_else(|| Error::invalid_path(&child_path))?;
            let dest = relative.split('/').fold(base.clone(), |acc, seg| acc.join(seg));

            if child.is_container {
                tokio::fs::create_dir_all(&dest).await?;
            } else {
                if let Some(parent) = dest.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                self.download_file(&child_path, child.metadata.size, &dest)
                    .await?;
                written.push(dest);
            }
        }

        info!("Downloaded {remote} ({count} files)", remote: remote.as_str(), count: written.len());
        Ok(written)
    }

    async fn download_file(&self, remote: &str, expected: Option<u64>, dest: &Path) -> Result<()> {
        let target = remote.to_string();
        let mut stream = self
            .dispatch("download", remote, |client| async move {
                client.download(&target).await
            })
            .await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let copied = tokio::io::copy(&mut stream, &mut file).await?;

        if let Some(size) = expected.filter(|size| *size != copied) {
            return Err(Error::Io(std::io::Error::other(format!(
                "downloaded {copied} bytes of {remote}, expected {size}"
            ))));
        }
        let dest_str = dest.display().to_string();
        debug!("Wrote {bytes} bytes to {dest}", bytes: copied, dest: dest_str);
        Ok(())
    }

    /// Upload a local file or directory tree
    ///
    /// When `remote` is an existing folder the source lands inside it under
    /// its own name. Existing remote files are never overwritten. Returns
    /// the metadata of everything created.
    pub async fn upload_from_local(&self, local: &Path, remote: &str) -> Result<Vec<ItemMetadata>> {
        self.reset_cache().await;

        let remote = normalize(remote);
        debug!("Invoking upload_from_local({remote})", remote: remote.as_str());

        let local_name = local
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::invalid_path(local.display().to_string()))?;
        let target = if self.is_container(&remote).await? {
            join(&remote, local_name)
        } else {
            remote.clone()
        };
        Self::validate_target(&target)?;
        // Resolving the target may have cached it as missing
        self.reset_cache().await;

        let mut created = Vec::new();
        if !local.is_dir() {
            created.push(self.upload_file(local, &target).await?);
            return Ok(created);
        }

        let mut pending = vec![(local.to_path_buf(), target)];
        while let Some((dir, remote_dir)) = pending.pop() {
            let folder = remote_dir.clone();
            created.push(
                self.dispatch("create_folder", &remote_dir, |client| async move {
                    client.create_folder(&folder).await
                })
                .await?,
            );

            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let name = name
                    .to_str()
                    .ok_or_else(|| Error::invalid_path(entry.path().display().to_string()))?;
                let child = join(&remote_dir, name);
                Self::validate_target(&child)?;

                if entry.file_type().await?.is_dir() {
                    pending.push((entry.path(), child));
                } else {
                    created.push(self.upload_file(&entry.path(), &child).await?);
                }
            }
        }

        info!("Uploaded {count} items to {remote}", count: created.len(), remote: remote.as_str());
        Ok(created)
    }

    async fn upload_file(&self, local: &Path, remote: &str) -> Result<ItemMetadata> {
        let file = tokio::fs::File::open(local).await?;
        let stream: ByteStream = Box::pin(file);
        let target = remote.to_string();
        self.dispatch("upload", remote, |client| async move {
            client.upload(&target, stream).await
        })
        .await
    }
}
