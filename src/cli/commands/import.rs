//! `credvault import`: bring over a credential from before encryption.
//!
//! The password is written exactly as given, without encryption, so rows
//! copied from an older plaintext store read back the same way they do
//! there.  Changing the password later encrypts it.

use crate::cli::output;
use crate::cli::{open_store, read_password, Cli};
use crate::errors::Result;

use super::add::{new_record, AddArgs};

/// Execute the `import` command.
pub fn execute(cli: &Cli, args: AddArgs<'_>) -> Result<()> {
    let password = read_password(&format!("Password for {}", args.title), args.password)?;
    let new = new_record(&args, &password);

    let store = open_store(cli)?;
    let record = store.import_legacy(&cli.owner, new)?;

    crate::audit::log_audit(cli, "import", record.id, Some(&record.title));

    output::warning("Imported password is stored as plaintext until it is changed.");
    output::success(&format!(
        "Imported '{}' as #{}",
        record.title,
        record.id.unwrap_or_default()
    ));

    Ok(())
}
