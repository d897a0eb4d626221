//! `credvault update`: change fields of a credential.
//!
//! The stored password is only re-encrypted when a new one is given.

use crate::cli::output;
use crate::cli::{open_store, read_password, Cli};
use crate::errors::Result;
use crate::vault::RecordUpdate;

/// Options for the `update` command.
pub struct UpdateArgs<'a> {
    pub title: Option<&'a str>,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub new_password: bool,
    pub website: Option<&'a str>,
    pub category: Option<&'a str>,
    pub notes: Option<&'a str>,
}

/// Execute the `update` command.
pub fn execute(cli: &Cli, id: i64, args: UpdateArgs<'_>) -> Result<()> {
    let password = if args.password.is_some() || args.new_password {
        Some(read_password("New password", args.password)?)
    } else {
        None
    };
    let password_changed = password.is_some();

    let update = RecordUpdate {
        title: args.title.map(str::to_owned),
        username: args.username.map(str::to_owned),
        password,
        website: args.website.map(str::to_owned),
        category: args.category.map(str::to_owned),
        notes: args.notes.map(str::to_owned),
    };

    let store = open_store(cli)?;
    let record = store.update(&cli.owner, id, update)?;

    let detail = if password_changed {
        "password changed"
    } else {
        "fields changed"
    };
    crate::audit::log_audit(cli, "update", Some(id), Some(detail));
    output::success(&format!("Updated '{}' (#{id})", record.title));

    Ok(())
}
