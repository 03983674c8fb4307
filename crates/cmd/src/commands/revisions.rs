// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use dropfs::{DEFAULT_REVISION_LIMIT, FilesystemAdapter};

use crate::common::format_item;

/// Revision history, newest first
pub async fn revisions_command(
    fs: &FilesystemAdapter,
    path: &str,
    limit: Option<u64>,
) -> Result<Vec<String>> {
    let entries = fs
        .list_revisions(path, limit.unwrap_or(DEFAULT_REVISION_LIMIT))
        .await?;
    Ok(entries
        .iter()
        .map(|entry| {
            format!(
                "{} {} {}",
                entry.revision_id,
                entry.server_modified.format("%Y-%m-%d %H:%M:%S"),
                entry.client_modified.format("%Y-%m-%d %H:%M:%S"),
            )
        })
        .collect())
}

pub async fn restore_command(
    fs: &FilesystemAdapter,
    path: &str,
    revision: &str,
) -> Result<Vec<String>> {
    let item = fs.restore_revision(path, revision).await?;
    Ok(vec![format_item(&item)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::memory_drive;

    #[tokio::test]
    async fn test_restore_listed_revision() {
        let (store, fs) = memory_drive();
        store.seed_file("/a.txt", b"one").await;

        let lines = revisions_command(&fs, "/a.txt", None).await.unwrap();
        assert_eq!(lines.len(), 1);
        let revision = lines[0].split(' ').next().unwrap().to_string();

        _ = fs.remove_item("/a.txt", false).await.unwrap();
        let lines = restore_command(&fs, "/a.txt", &revision).await.unwrap();
        assert!(lines[0].ends_with("/a.txt"));
        assert_eq!(store.content("/a.txt").await.unwrap(), b"one");
    }
}
