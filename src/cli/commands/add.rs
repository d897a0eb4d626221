//! `credvault add`: store a new credential.

use crate::cli::output;
use crate::cli::{open_store, read_password, Cli};
use crate::errors::Result;
use crate::vault::NewRecord;

/// Options for the `add` command.
pub struct AddArgs<'a> {
    pub title: &'a str,
    pub username: &'a str,
    pub password: Option<&'a str>,
    pub website: Option<&'a str>,
    pub category: Option<&'a str>,
    pub notes: Option<&'a str>,
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, args: AddArgs<'_>) -> Result<()> {
    let password = read_password(&format!("Password for {}", args.title), args.password)?;

    let new = new_record(&args, &password);

    let store = open_store(cli)?;
    let record = store.create(&cli.owner, new)?;

    crate::audit::log_audit(cli, "create", record.id, Some(&record.title));

    output::success(&format!(
        "Stored '{}' as #{} ({} total)",
        record.title,
        record.id.unwrap_or_default(),
        store.count(&cli.owner)?
    ));

    Ok(())
}

/// Build a `NewRecord` from the shared `add`/`import` arguments.
pub(super) fn new_record(args: &AddArgs<'_>, password: &str) -> NewRecord {
    let mut new = NewRecord::new(args.title, args.username, password);
    if let Some(website) = args.website {
        new = new.website(website);
    }
    if let Some(category) = args.category {
        new = new.category(category);
    }
    if let Some(notes) = args.notes {
        new = new.notes(notes);
    }
    new
}
