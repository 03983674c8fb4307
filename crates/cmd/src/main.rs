// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use diagnostics::*;
use std::path::PathBuf;

use cmd::commands;
use cmd::common::DriveContext;
use dropfs::FilesystemAdapter;

#[derive(Parser)]
#[command(author, version, about = "Browse and manage a Dropbox drive", long_about = None)]
#[command(name = "dropfs")]
struct Cli {
    /// Drive to operate on (defaults to the first configured drive)
    #[arg(short, long, global = true)]
    drive: Option<String>,

    /// Configuration file (overrides DROPFS_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Access token to use instead of the stored credentials
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Drive(DriveCommand),
    /// Store tokens for the drive
    Login {
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: Option<String>,
    },
    /// Forget the drive's tokens
    Logout,
    /// Show registered providers and their capabilities
    Providers {
        /// Provider name
        name: Option<String>,
        /// Only providers declaring this capability
        #[arg(long)]
        capability: Option<String>,
    },
}

/// Subcommands that operate on a mounted drive
#[derive(Subcommand)]
enum DriveCommand {
    /// Print True if the path exists
    Test { path: String },
    /// Print True if the path is a folder
    Container { path: String },
    /// Show one item
    Stat { path: String },
    /// List a folder, or the items matching a wildcard
    Ls {
        #[arg(default_value = "/")]
        path: String,
        /// Include descendants
        #[arg(short, long)]
        recurse: bool,
    },
    /// Expand a wildcard in the last path segment
    Glob { pattern: String },
    /// Copy an item on the drive
    Cp {
        path: String,
        dest: String,
        #[arg(short, long)]
        recurse: bool,
    },
    /// Move or rename an item on the drive
    Mv { path: String, dest: String },
    /// Delete an item
    Rm {
        path: String,
        #[arg(short, long)]
        recurse: bool,
    },
    /// Create a folder or a file
    New {
        path: String,
        /// `directory` or `file`
        #[arg(short = 't', long = "type")]
        item_type: String,
        /// Content of a new file
        #[arg(short, long)]
        value: Option<String>,
    },
    /// List a file's revisions, newest first
    Revisions {
        path: String,
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Restore a file to an earlier revision
    Restore { path: String, revision: String },
    /// Copy an item from the drive to the local filesystem
    Download { remote: String, local: PathBuf },
    /// Copy a local file or directory tree onto the drive
    Upload { local: PathBuf, remote: String },
}

async fn run(ctx: &DriveContext, command: Commands) -> Result<Vec<String>> {
    match command {
        Commands::Login {
            access_token,
            refresh_token,
        } => {
            let config = ctx.config()?;
            let secrets = ctx.secrets(&config)?;
            commands::login_command(
                &secrets,
                &ctx.drive_name(&config),
                &access_token,
                refresh_token.as_deref(),
            )
        }
        Commands::Logout => {
            let config = ctx.config()?;
            let secrets = ctx.secrets(&config)?;
            commands::logout_command(&secrets, &ctx.drive_name(&config))
        }
        Commands::Providers { name, capability } => {
            commands::providers_command(name.as_deref(), capability.as_deref())
        }
        Commands::Drive(command) => {
            let fs = ctx.open_adapter()?;
            run_on_drive(&fs, command).await
        }
    }
}

async fn run_on_drive(fs: &FilesystemAdapter, command: DriveCommand) -> Result<Vec<String>> {
    match command {
        DriveCommand::Test { path } => commands::test_command(fs, &path).await,
        DriveCommand::Container { path } => commands::container_command(fs, &path).await,
        DriveCommand::Stat { path } => commands::stat_command(fs, &path).await,
        DriveCommand::Ls { path, recurse } => commands::list_command(fs, &path, recurse).await,
        DriveCommand::Glob { pattern } => commands::glob_command(fs, &pattern).await,
        DriveCommand::Cp {
            path,
            dest,
            recurse,
        } => commands::copy_command(fs, &path, &dest, recurse).await,
        DriveCommand::Mv { path, dest } => commands::move_command(fs, &path, &dest).await,
        DriveCommand::Rm { path, recurse } => commands::remove_command(fs, &path, recurse).await,
        DriveCommand::New {
            path,
            item_type,
            value,
        } => commands::new_command(fs, &path, &item_type, value.as_deref()).await,
        DriveCommand::Revisions { path, limit } => {
            commands::revisions_command(fs, &path, limit).await
        }
        DriveCommand::Restore { path, revision } => {
            commands::restore_command(fs, &path, &revision).await
        }
        DriveCommand::Download { remote, local } => {
            commands::download_command(fs, &remote, &local).await
        }
        DriveCommand::Upload { local, remote } => {
            commands::upload_command(fs, &local, &remote).await
        }
    }
}

#[allow(clippy::print_stdout)]
#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let ctx = DriveContext {
        config_path: cli.config,
        drive: cli.drive,
        token: cli.token,
    };

    match run(&ctx, cli.command).await {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            Ok(())
        }
        Err(e) => {
            let error_str = format!("{e:#}");
            error!("Command failed: {error}", error: error_str.as_str());
            Err(e)
        }
    }
}
