// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use diagnostics::*;
use dropfs::CacheConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "DROPFS_CONFIG";

/// Command-line configuration
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DropfsConfig {
    /// Where drive tokens are kept; defaults to the user config directory
    pub secrets_file: Option<PathBuf>,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub drives: Vec<DriveConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CacheSection {
    /// Refresh window such as "300s" or "5 minutes"
    pub refresh: Option<String>,
}

/// One named drive
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DriveConfig {
    pub name: String,
    /// Inline access token; overrides the secrets file
    pub access_token: Option<String>,
}

impl DropfsConfig {
    pub fn cache_config(&self) -> Result<CacheConfig> {
        match &self.cache.refresh {
            None => Ok(CacheConfig::default()),
            Some(text) => {
                let refresh_window = parse_duration::parse(text)
                    .with_context(|| format!("Invalid cache refresh window '{text}'"))?;
                Ok(CacheConfig { refresh_window })
            }
        }
    }

    #[must_use]
    pub fn drive(&self, name: &str) -> Option<&DriveConfig> {
        self.drives.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Secrets file location, falling back to `$HOME/.config/dropfs/secrets.json`
    pub fn secrets_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.secrets_file {
            return Ok(path.clone());
        }
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("dropfs")
            .join("secrets.json"))
    }
}

/// Load configuration from YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DropfsConfig> {
    let path_str = path.as_ref().display().to_string();
    debug!("Loading configuration from {path}", path: path_str.as_str());
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

    let config: DropfsConfig = serde_yaml_ng::from_str(&content)
        .with_context(|| "Failed to parse YAML configuration")?;

    validate_config(&config)?;
    debug!("Configuration lists {count} drives", count: config.drives.len());
    Ok(config)
}

/// Load the file named by `path`, else by `DROPFS_CONFIG`, else defaults
pub fn resolve_config(path: Option<&Path>) -> Result<DropfsConfig> {
    if let Some(path) = path {
        return load_config(path);
    }
    match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => load_config(path),
        _ => Ok(DropfsConfig::default()),
    }
}

/// Validate configuration
pub(crate) fn validate_config(config: &DropfsConfig) -> Result<()> {
    let mut seen = HashSet::new();
    for drive in &config.drives {
        if drive.name.is_empty() {
            anyhow::bail!("Drive name cannot be empty");
        }
        if !seen.insert(drive.name.to_lowercase()) {
            anyhow::bail!("Drive '{}' is configured more than once", drive.name);
        }
    }

    if config.cache_config()?.refresh_window.is_zero() {
        anyhow::bail!("cache.refresh must be greater than 0");
    }

    Ok(())
}
