//! `credvault delete`: remove a credential.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: i64, force: bool) -> Result<()> {
    let store = open_store(cli)?;
    let record = store.get(&cli.owner, id)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{}' (#{id})?", record.title))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    store.delete(&cli.owner, id)?;

    crate::audit::log_audit(cli, "delete", Some(id), Some(&record.title));
    output::success(&format!("Deleted '{}'", record.title));

    Ok(())
}
