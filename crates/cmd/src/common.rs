// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use dropfs::{
    DriveSession, DriveSpec, FileSecretStore, FilesystemAdapter, ProviderItem, SecretStore,
};
use std::path::PathBuf;

use crate::config::{DropfsConfig, resolve_config};

/// Drive used when neither `--drive` nor the configuration names one
pub const DEFAULT_DRIVE: &str = "default";

/// Global options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct DriveContext {
    pub config_path: Option<PathBuf>,
    pub drive: Option<String>,
    pub token: Option<String>,
}

impl DriveContext {
    pub fn config(&self) -> Result<DropfsConfig> {
        resolve_config(self.config_path.as_deref())
    }

    /// Name of the drive to operate on
    #[must_use]
    pub fn drive_name(&self, config: &DropfsConfig) -> String {
        self.drive
            .clone()
            .or_else(|| config.drives.first().map(|d| d.name.clone()))
            .unwrap_or_else(|| DEFAULT_DRIVE.to_string())
    }

    /// What to mount: `--token` wins over a token in the configuration
    #[must_use]
    pub fn drive_spec(&self, config: &DropfsConfig) -> DriveSpec {
        let name = self.drive_name(config);
        let inline = self
            .token
            .clone()
            .or_else(|| config.drive(&name).and_then(|d| d.access_token.clone()));
        match inline {
            Some(token) => DriveSpec::new(name).with_credential(token),
            None => DriveSpec::new(name),
        }
    }

    pub fn secrets(&self, config: &DropfsConfig) -> Result<FileSecretStore> {
        Ok(FileSecretStore::new(config.secrets_path()?))
    }

    /// Open the drive against the hosted API
    pub fn open_adapter(&self) -> Result<FilesystemAdapter> {
        let config = self.config()?;
        let spec = self.drive_spec(&config);
        let secrets = self.secrets(&config)?;
        self.open_with(&config, &spec, &secrets)
    }

    fn open_with(
        &self,
        config: &DropfsConfig,
        spec: &DriveSpec,
        secrets: &dyn SecretStore,
    ) -> Result<FilesystemAdapter> {
        let session = DriveSession::open(spec, secrets, &dropbox::connect)
            .with_context(|| format!("Failed to open drive '{}'", spec.name))?;
        Ok(FilesystemAdapter::with_session(session, config.cache_config()?))
    }
}

/// One listing line: kind, size, modification time, path
#[must_use]
pub fn format_item(item: &ProviderItem) -> String {
    let kind = if item.is_container { 'd' } else { '-' };
    let size = item
        .metadata
        .size
        .map_or_else(|| "-".to_string(), format_file_size);
    let modified = item.metadata.server_modified.map_or_else(
        || "-".to_string(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    );
    format!("{kind} {size:>8} {modified:>16} {}", item.path)
}

/// Helper function to format file sizes
#[must_use]
pub fn format_file_size(size: u64) -> String {
    if size >= 1024 * 1024 {
        format!("{:.1}MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1}KB", size as f64 / 1024.0)
    } else {
        format!("{size}B")
    }
}
