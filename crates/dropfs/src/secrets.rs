// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Named secret storage for drive credentials

use crate::error::{Error, Result};
use diagnostics::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Secrets are capped at 512 bytes of UTF-16
pub const MAX_SECRET_BYTES: usize = 512;

/// Opaque key/value secret store
pub trait SecretStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, secret: &str) -> Result<()>;

    /// Returns whether a secret was present
    fn delete(&self, key: &str) -> Result<bool>;
}

fn check_secret_size(secret: &str) -> Result<()> {
    let bytes = secret.encode_utf16().count() * 2;
    if bytes > MAX_SECRET_BYTES {
        return Err(Error::secret(format!(
            "The secret has exceeded {MAX_SECRET_BYTES} bytes ({bytes})"
        )));
    }
    Ok(())
}

fn poisoned<T>(_: T) -> Error {
    Error::secret("secret store lock poisoned")
}

/// Process-local secret store, used by tests and for inline credentials
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.secrets.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn write(&self, key: &str, secret: &str) -> Result<()> {
        check_secret_size(secret)?;
        _ = self
            .secrets
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), secret.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.secrets.lock().map_err(poisoned)?.remove(key).is_some())
    }
}

/// Secrets kept in a JSON object on disk
///
/// The file is created on first write (parent directories included) and is
/// owner-readable only on Unix.
pub struct FileSecretStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSecretStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Error::secret(format!(
                "Failed to parse secret file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, secrets: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(secrets)
            .map_err(|e| Error::secret(format!("Failed to encode secrets: {e}")))?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl SecretStore for FileSecretStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, secret: &str) -> Result<()> {
        check_secret_size(secret)?;
        let _guard = self.lock.lock().map_err(poisoned)?;
        let mut secrets = self.load()?;
        _ = secrets.insert(key.to_string(), secret.to_string());
        self.save(&secrets)?;
        debug!("Stored secret {key}", key: key);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        let mut secrets = self.load()?;
        if secrets.remove(key).is_none() {
            return Ok(false);
        }
        self.save(&secrets)?;
        debug!("Deleted secret {key}", key: key);
        Ok(true)
    }
}
