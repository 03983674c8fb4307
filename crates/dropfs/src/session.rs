// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Drive sessions and their credentials
//!
//! A session binds one mounted drive to one remote store client. The access
//! token is resolved once, when the session is opened: an inline credential
//! wins, otherwise the secret store is consulted under the drive's name.

use crate::error::{Error, Result};
use crate::remote::RemoteStore;
use crate::secrets::SecretStore;
use diagnostics::*;
use std::sync::Arc;

const CREDENTIAL_NAME_BASE: &str = "DropboxUserToken";

/// Secret-store key of a drive's access token
#[must_use]
pub fn access_token_name(drive: &str) -> String {
    format!("{CREDENTIAL_NAME_BASE}-{drive}-AccessToken")
}

/// Secret-store key of a drive's refresh token
#[must_use]
pub fn refresh_token_name(drive: &str) -> String {
    format!("{CREDENTIAL_NAME_BASE}-{drive}-RefreshToken")
}

/// What the host asks for when it mounts a drive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveSpec {
    pub name: String,
    /// Inline access token; takes precedence over the secret store
    pub credential: Option<String>,
}

impl DriveSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credential: None,
        }
    }

    #[must_use]
    pub fn with_credential(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(token.into());
        self
    }
}

/// Builds a remote store client from an access token
pub trait Connector: Send + Sync {
    fn connect(&self, access_token: &str) -> Result<Arc<dyn RemoteStore>>;
}

impl<F> Connector for F
where
    F: Fn(&str) -> Result<Arc<dyn RemoteStore>> + Send + Sync,
{
    fn connect(&self, access_token: &str) -> Result<Arc<dyn RemoteStore>> {
        self(access_token)
    }
}

/// One mounted drive and its client
#[derive(Clone)]
pub struct DriveSession {
    name: String,
    client: Arc<dyn RemoteStore>,
}

impl std::fmt::Debug for DriveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveSession")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl DriveSession {
    /// Resolve credentials and connect
    pub fn open(
        spec: &DriveSpec,
        secrets: &dyn SecretStore,
        connector: &dyn Connector,
    ) -> Result<Self> {
        if spec.name.is_empty() {
            return Err(Error::invalid_path("drive name is empty"));
        }

        let token = match spec.credential.as_deref().filter(|t| !t.is_empty()) {
            Some(inline) => inline.to_string(),
            None => secrets
                .read(&access_token_name(&spec.name))?
                .ok_or_else(|| {
                    Error::secret(format!("no credential stored for drive {}", spec.name))
                })?,
        };

        let client = connector.connect(&token)?;
        info!("Opened drive {drive}", drive: spec.name.as_str());
        Ok(Self::with_client(spec.name.clone(), client))
    }

    /// Session around an already-built client
    pub fn with_client(name: impl Into<String>, client: Arc<dyn RemoteStore>) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn RemoteStore> {
        self.client.clone()
    }
}

/// Persist a drive's tokens
pub fn store_credentials(
    secrets: &dyn SecretStore,
    drive: &str,
    access_token: &str,
    refresh_token: Option<&str>,
) -> Result<()> {
    secrets.write(&access_token_name(drive), access_token)?;
    if let Some(refresh) = refresh_token {
        secrets.write(&refresh_token_name(drive), refresh)?;
    }
    Ok(())
}

/// Forget a drive's tokens; true only if both were stored
///
/// Revoking the grant on the remote side is left to the user.
pub fn remove_credentials(secrets: &dyn SecretStore, drive: &str) -> Result<bool> {
    let access = secrets.delete(&access_token_name(drive))?;
    let refresh = secrets.delete(&refresh_token_name(drive))?;
    Ok(access && refresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::secrets::MemorySecretStore;
    use std::sync::Mutex;

    fn recording_connector(seen: &Mutex<Vec<String>>) -> impl Connector + '_ {
        move |token: &str| -> Result<Arc<dyn RemoteStore>> {
            seen.lock().unwrap().push(token.to_string());
            Ok(Arc::new(MemoryStore::new()))
        }
    }

    #[test]
    fn test_credential_names() {
        assert_eq!(access_token_name("work"), "DropboxUserToken-work-AccessToken");
        assert_eq!(refresh_token_name("work"), "DropboxUserToken-work-RefreshToken");
    }

    #[test]
    fn test_inline_credential_wins() {
        let secrets = MemorySecretStore::new();
        secrets.write(&access_token_name("d"), "stored").unwrap();
        let seen = Mutex::new(Vec::new());

        let session = DriveSession::open(
            &DriveSpec::new("d").with_credential("inline"),
            &secrets,
            &recording_connector(&seen),
        )
        .unwrap();

        assert_eq!(session.name(), "d");
        assert_eq!(*seen.lock().unwrap(), ["inline"]);
    }

    #[test]
    fn test_secret_store_fallback() {
        let secrets = MemorySecretStore::new();
        store_credentials(&secrets, "d", "stored", Some("refresh")).unwrap();
        let seen = Mutex::new(Vec::new());

        _ = DriveSession::open(&DriveSpec::new("d"), &secrets, &recording_connector(&seen))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), ["stored"]);
    }

    #[test]
    fn test_missing_credential_is_an_error() {
        let secrets = MemorySecretStore::new();
        let seen = Mutex::new(Vec::new());
        let err = DriveSession::open(&DriveSpec::new("d"), &secrets, &recording_connector(&seen))
            .unwrap_err();
        assert!(matches!(err, Error::Secret(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_remove_credentials() {
        let secrets = MemorySecretStore::new();
        assert!(!remove_credentials(&secrets, "d").unwrap());

        store_credentials(&secrets, "d", "a", None).unwrap();
        assert!(!remove_credentials(&secrets, "d").unwrap());
        assert_eq!(secrets.read(&access_token_name("d")).unwrap(), None);

        store_credentials(&secrets, "d", "a", Some("r")).unwrap();
        assert!(remove_credentials(&secrets, "d").unwrap());
    }
}
