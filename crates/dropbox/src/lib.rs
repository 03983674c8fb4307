// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Dropbox v2 HTTP client implementing [`dropfs::RemoteStore`]

pub mod client;
pub mod error;
pub mod models;

pub use client::{API_BASE_URL, CONTENT_BASE_URL, DropboxClient};
pub use error::{DropboxError, Result, classify};

use dropfs::{RemoteError, RemoteStore};
use std::sync::Arc;

/// Connect to the hosted API with an access token
///
/// Usable directly as a [`dropfs::Connector`].
pub fn connect(access_token: &str) -> dropfs::Result<Arc<dyn RemoteStore>> {
    let client = DropboxClient::new(access_token).map_err(RemoteError::from)?;
    Ok(Arc::new(client))
}
