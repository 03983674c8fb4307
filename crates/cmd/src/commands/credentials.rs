// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use dropfs::{SecretStore, remove_credentials, store_credentials};

/// Remember tokens for a drive
pub fn login_command(
    secrets: &dyn SecretStore,
    drive: &str,
    access_token: &str,
    refresh_token: Option<&str>,
) -> Result<Vec<String>> {
    store_credentials(secrets, drive, access_token, refresh_token)
        .with_context(|| format!("Failed to store credentials for drive '{drive}'"))?;
    Ok(vec![format!("Stored credentials for drive '{drive}'")])
}

pub fn logout_command(secrets: &dyn SecretStore, drive: &str) -> Result<Vec<String>> {
    let removed = remove_credentials(secrets, drive)
        .with_context(|| format!("Failed to remove credentials for drive '{drive}'"))?;
    let line = if removed {
        format!("Removed credentials for drive '{drive}'")
    } else {
        format!("Drive '{drive}' had no complete set of credentials")
    };
    Ok(vec![line])
}
