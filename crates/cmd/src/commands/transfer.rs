// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use dropfs::FilesystemAdapter;
use std::path::Path;

pub async fn download_command(
    fs: &FilesystemAdapter,
    remote: &str,
    local: &Path,
) -> Result<Vec<String>> {
    let written = fs.download_to_local(remote, local).await?;
    Ok(written
        .iter()
        .map(|p| format!("downloaded {}", p.display()))
        .collect())
}

pub async fn upload_command(
    fs: &FilesystemAdapter,
    local: &Path,
    remote: &str,
) -> Result<Vec<String>> {
    let created = fs.upload_from_local(local, remote).await?;
    Ok(created
        .iter()
        .map(|item| format!("uploaded {}", item.path))
        .collect())
}
