// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, anyhow};
use dropfs::FilesystemAdapter;
use dropfs::path::has_wildcard;

use crate::common::format_item;

fn bool_line(value: bool) -> Vec<String> {
    vec![if value { "True" } else { "False" }.to_string()]
}

/// Does the path exist
pub async fn test_command(fs: &FilesystemAdapter, path: &str) -> Result<Vec<String>> {
    Ok(bool_line(fs.exists(path).await?))
}

/// Is the path a folder
pub async fn container_command(fs: &FilesystemAdapter, path: &str) -> Result<Vec<String>> {
    Ok(bool_line(fs.is_container(path).await?))
}

pub async fn stat_command(fs: &FilesystemAdapter, path: &str) -> Result<Vec<String>> {
    let item = fs
        .get_item(path)
        .await?
        .ok_or_else(|| anyhow!("Cannot find path '{path}' because it does not exist"))?;
    Ok(vec![format_item(&item)])
}

/// List a folder; wildcard leaves are expanded first
pub async fn list_command(
    fs: &FilesystemAdapter,
    path: &str,
    recurse: bool,
) -> Result<Vec<String>> {
    let normalized = dropfs::normalize(path);
    if has_wildcard(&normalized) {
        let mut lines = Vec::new();
        for matched in fs.expand_path(&normalized).await?.unwrap_or_default() {
            if let Some(item) = fs.get_item(&matched).await? {
                lines.push(format_item(&item));
            }
        }
        return Ok(lines);
    }

    if !fs.is_container(&normalized).await? {
        return stat_command(fs, &normalized).await;
    }
    Ok(fs
        .get_children(&normalized, recurse)
        .await?
        .iter()
        .map(format_item)
        .collect())
}

/// Paths matching a wildcard in the last segment
pub async fn glob_command(fs: &FilesystemAdapter, pattern: &str) -> Result<Vec<String>> {
    Ok(fs.expand_path(pattern).await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::memory_drive;

    #[tokio::test]
    async fn test_boolean_queries() {
        let (store, fs) = memory_drive();
        store.seed_file("/docs/a.txt", b"a").await;

        assert_eq!(test_command(&fs, "/docs/a.txt").await.unwrap(), ["True"]);
        assert_eq!(test_command(&fs, "/docs/z.txt").await.unwrap(), ["False"]);
        assert_eq!(container_command(&fs, "\\docs").await.unwrap(), ["True"]);
    }

    #[tokio::test]
    async fn test_list_folder_and_wildcard() {
        let (store, fs) = memory_drive();
        store.seed_file("/docs/a.txt", b"a").await;
        store.seed_file("/docs/b.csv", b"b").await;
        store.seed_folder("/docs/sub").await;

        let lines = list_command(&fs, "/docs", false).await.unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('d'));
        assert!(lines[0].ends_with("/docs/sub"));

        let lines = list_command(&fs, "/docs/*.txt", false).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("/docs/a.txt"));

        assert_eq!(
            glob_command(&fs, "/docs/*.CSV").await.unwrap(),
            ["/docs/b.csv"]
        );
    }

    #[tokio::test]
    async fn test_stat_missing_path() {
        let (_store, fs) = memory_drive();
        let err = stat_command(&fs, "/nope").await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
