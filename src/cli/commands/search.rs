//! `credvault search`: find credentials by text.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;
use crate::vault::RecordView;

/// Execute the `search` command.
pub fn execute(cli: &Cli, query: &str, json: bool) -> Result<()> {
    let store = open_store(cli)?;
    let records = store.search(&cli.owner, query)?;

    if json {
        let views: Vec<RecordView> = records.iter().map(|r| store.view(r)).collect();
        return output::print_json(&views);
    }

    output::info(&format!("{} match(es) for '{query}'", records.len()));
    output::print_records_table(&records);

    Ok(())
}
