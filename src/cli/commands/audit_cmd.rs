//! `credvault audit`: display the audit log.
//!
//! Usage:
//!   credvault audit               # show last 50 entries
//!   credvault audit --last 20     # show last 20
//!   credvault audit --since 7d    # entries from last 7 days

use chrono::{DateTime, Duration, Utc};

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::{database_path, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let db_path = database_path(cli)?;
    let audit = AuditLog::open(&db_path)
        .ok_or_else(|| VaultError::AuditError("failed to open audit database".into()))?;

    let since_dt = match since {
        Some(s) => Some(parse_since(s)?),
        None => None,
    };

    let entries = audit.query(&cli.owner, last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

/// Turn "7d", "24h" or "30m" into the point in time that long ago.
fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        VaultError::CommandFailed(format!(
            "invalid duration '{input}', use a format like 7d, 24h, or 30m"
        ))
    };

    let split = input
        .len()
        .checked_sub(1)
        .filter(|&i| input.is_char_boundary(i))
        .ok_or_else(invalid)?;
    let (num, unit) = input.split_at(split);
    let n: i64 = num.parse().map_err(|_| invalid())?;

    let ago = match unit {
        "d" => Duration::days(n),
        "h" => Duration::hours(n),
        "m" => Duration::minutes(n),
        _ => return Err(invalid()),
    };

    Ok(Utc::now() - ago)
}

/// Print audit entries in a formatted table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Credential", "Details"]);

    for entry in entries {
        let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let op = colorize_operation(&entry.operation);
        let record = entry
            .record_id
            .map_or_else(|| "-".to_string(), |id| format!("#{id}"));
        let details = entry.details.as_deref().unwrap_or("-");

        table.add_row(vec![time, op, record, details.to_string()]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display.
fn colorize_operation(op: &str) -> String {
    use console::style;

    match op {
        "create" => style(op).green().to_string(),
        "update" => style(op).blue().to_string(),
        "delete" => style(op).red().to_string(),
        "import" => style(op).cyan().to_string(),
        _ => op.to_string(),
    }
}
