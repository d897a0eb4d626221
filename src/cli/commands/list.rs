//! `credvault list`: display credentials in a table.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;
use crate::vault::RecordView;

/// Execute the `list` command.
pub fn execute(cli: &Cli, category: Option<&str>, json: bool) -> Result<()> {
    let store = open_store(cli)?;

    let records = match category {
        Some(c) => store.list_by_category(&cli.owner, c)?,
        None => store.list(&cli.owner)?,
    };

    if json {
        // One corrupt row shows a placeholder; the rest still list.
        let views: Vec<RecordView> = records.iter().map(|r| store.view(r)).collect();
        return output::print_json(&views);
    }

    match category {
        Some(c) => output::info(&format!("{} credential(s) in '{c}'", records.len())),
        None => output::info(&format!("{} credential(s)", records.len())),
    }
    output::print_records_table(&records);

    Ok(())
}
