// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Subcommand bodies
//!
//! Each command returns the lines to print so it can be exercised against
//! an in-memory drive.

pub mod credentials;
pub mod mutate;
pub mod providers;
pub mod query;
pub mod revisions;
pub mod transfer;

pub use credentials::{login_command, logout_command};
pub use mutate::{copy_command, move_command, new_command, remove_command};
pub use providers::providers_command;
pub use query::{container_command, glob_command, list_command, stat_command, test_command};
pub use revisions::{restore_command, revisions_command};
pub use transfer::{download_command, upload_command};

#[cfg(test)]
pub(crate) fn memory_drive() -> (std::sync::Arc<dropfs::MemoryStore>, dropfs::FilesystemAdapter) {
    let store = std::sync::Arc::new(dropfs::MemoryStore::new());
    let fs = dropfs::FilesystemAdapter::with_session(
        dropfs::DriveSession::with_client("test", store.clone()),
        dropfs::CacheConfig::default(),
    );
    (store, fs)
}
