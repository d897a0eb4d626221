//! One module per subcommand; each exposes an `execute` function.

pub mod add;
pub mod audit_cmd;
pub mod delete;
pub mod get;
pub mod import;
pub mod list;
pub mod search;
pub mod update;
