//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::{KeyMaterial, SecretCodec};
use crate::errors::{Result, VaultError};
use crate::vault::RecordStore;

/// credvault CLI: credential vault with encrypted-at-rest passwords.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Credential vault with encrypted-at-rest passwords",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Owner whose credentials to operate on
    #[arg(long, env = "CREDVAULT_OWNER", default_value = "default", global = true)]
    pub owner: String,

    /// Database file (default: from .credvault.toml, else credvault.db)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Store a new credential
    Add {
        /// Title of the entry (e.g. GitHub)
        title: String,
        /// Account username
        username: String,
        /// Password (omit for piped input or interactive prompt)
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        website: Option<String>,
        /// Category (default: General)
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Store a credential from a pre-encryption vault as plaintext
    Import {
        title: String,
        username: String,
        /// Password (omit for piped input or interactive prompt)
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a credential with its password
    Get {
        /// Credential id
        id: i64,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List credentials
    List {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
        /// Print as JSON (includes passwords)
        #[arg(long)]
        json: bool,
    },

    /// Search titles, usernames, websites and notes
    Search {
        query: String,
        /// Print as JSON (includes passwords)
        #[arg(long)]
        json: bool,
    },

    /// Update fields of a credential
    Update {
        /// Credential id
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// New password value
        #[arg(long, conflicts_with = "new_password")]
        password: Option<String>,
        /// Prompt for a new password
        #[arg(long)]
        new_password: bool,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a credential
    Delete {
        /// Credential id
        id: i64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Install the tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credvault={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Load `.credvault.toml` from the current directory.
pub fn load_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    Settings::load(&cwd)
}

/// Resolve the database path from `--db` or the settings.
pub fn database_path(cli: &Cli) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    match &cli.db {
        Some(db) => Ok(cwd.join(db)),
        None => Ok(load_settings()?.database_path(&cwd)),
    }
}

/// Derive the vault key and open the record store.
///
/// The key is derived once here and shared by every operation of the
/// command.
pub fn open_store(cli: &Cli) -> Result<RecordStore> {
    let settings = load_settings()?;
    let key = KeyMaterial::from_settings(&settings)?;
    if key.is_fallback() {
        output::tip(&format!(
            "Set {} to protect stored passwords with your own secret.",
            settings.secret_env
        ));
    }

    let path = database_path(cli)?;
    RecordStore::open(&path, SecretCodec::new(key))
}

/// Get a password from, in order:
/// 1. the inline value (warns about shell history)
/// 2. piped stdin
/// 3. an interactive hidden prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn read_password(prompt: &str, inline: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = inline {
        output::warning("Password provided on command line; it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(&['\r', '\n'][..]);
        return Ok(Zeroizing::new(trimmed.to_string()));
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}
