// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use dropfs::FilesystemAdapter;

use crate::common::format_item;

pub async fn copy_command(
    fs: &FilesystemAdapter,
    path: &str,
    dest: &str,
    recurse: bool,
) -> Result<Vec<String>> {
    let item = fs.copy_item(path, dest, recurse).await?;
    Ok(vec![format_item(&item)])
}

pub async fn move_command(fs: &FilesystemAdapter, path: &str, dest: &str) -> Result<Vec<String>> {
    let item = fs.move_item(path, dest).await?;
    Ok(vec![format_item(&item)])
}

pub async fn remove_command(
    fs: &FilesystemAdapter,
    path: &str,
    recurse: bool,
) -> Result<Vec<String>> {
    let item = fs.remove_item(path, recurse).await?;
    Ok(vec![format!("removed {}", item.path)])
}

/// Create a folder or a file; `value` becomes the file's content
pub async fn new_command(
    fs: &FilesystemAdapter,
    path: &str,
    item_type: &str,
    value: Option<&str>,
) -> Result<Vec<String>> {
    let item = fs
        .new_item(path, item_type, value.map(str::as_bytes))
        .await?;
    Ok(vec![format_item(&item)])
}
