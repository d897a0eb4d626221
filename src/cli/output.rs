//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::errors::{Result, VaultError};
use crate::vault::{RecordView, VaultRecord};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of records (no passwords).
pub fn print_records_table(records: &[VaultRecord]) {
    if records.is_empty() {
        info("No credentials found.");
        tip("Run `credvault add <TITLE> <USERNAME>` to store your first one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Title", "Username", "Category", "Website", "Updated"]);

    for r in records {
        table.add_row(vec![
            r.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            r.title.clone(),
            r.username.clone(),
            r.category.clone(),
            r.website.clone(),
            r.last_updated.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print one record with its revealed password.
pub fn print_record(view: &RecordView) {
    let password = if view.decryption_failed {
        style(view.password.as_str()).red().to_string()
    } else {
        view.password.clone()
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let id = view.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let updated = view.last_updated.format("%Y-%m-%d %H:%M:%S").to_string();
    let rows = [
        ("ID", id.as_str()),
        ("Title", view.title.as_str()),
        ("Username", view.username.as_str()),
        ("Password", password.as_str()),
        ("Website", view.website.as_str()),
        ("Category", view.category.as_str()),
        ("Notes", view.notes.as_str()),
        ("Updated", updated.as_str()),
    ];
    for (label, value) in rows {
        table.add_row(vec![style(label).bold().to_string(), value.to_string()]);
    }

    println!("{table}");
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| VaultError::SerializationError(format!("JSON encode: {e}")))?;
    println!("{json}");
    Ok(())
}
