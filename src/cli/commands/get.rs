//! `credvault get`: show one credential with its password.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, id: i64, json: bool) -> Result<()> {
    let store = open_store(cli)?;
    let record = store.get(&cli.owner, id)?;
    let view = store.view(&record);

    if json {
        output::print_json(&view)?;
    } else {
        output::print_record(&view);
    }

    if view.decryption_failed {
        output::warning("The stored password could not be decrypted.");
    }

    Ok(())
}
