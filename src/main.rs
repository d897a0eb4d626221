use clap::Parser;
use credvault::cli::commands::add::AddArgs;
use credvault::cli::commands::update::UpdateArgs;
use credvault::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    credvault::cli::init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Add {
            ref title,
            ref username,
            ref password,
            ref website,
            ref category,
            ref notes,
        } => credvault::cli::commands::add::execute(
            &cli,
            AddArgs {
                title,
                username,
                password: password.as_deref(),
                website: website.as_deref(),
                category: category.as_deref(),
                notes: notes.as_deref(),
            },
        ),
        Commands::Import {
            ref title,
            ref username,
            ref password,
            ref website,
            ref category,
            ref notes,
        } => credvault::cli::commands::import::execute(
            &cli,
            AddArgs {
                title,
                username,
                password: password.as_deref(),
                website: website.as_deref(),
                category: category.as_deref(),
                notes: notes.as_deref(),
            },
        ),
        Commands::Get { id, json } => credvault::cli::commands::get::execute(&cli, id, json),
        Commands::List { ref category, json } => {
            credvault::cli::commands::list::execute(&cli, category.as_deref(), json)
        }
        Commands::Search { ref query, json } => {
            credvault::cli::commands::search::execute(&cli, query, json)
        }
        Commands::Update {
            id,
            ref title,
            ref username,
            ref password,
            new_password,
            ref website,
            ref category,
            ref notes,
        } => credvault::cli::commands::update::execute(
            &cli,
            id,
            UpdateArgs {
                title: title.as_deref(),
                username: username.as_deref(),
                password: password.as_deref(),
                new_password,
                website: website.as_deref(),
                category: category.as_deref(),
                notes: notes.as_deref(),
            },
        ),
        Commands::Delete { id, force } => credvault::cli::commands::delete::execute(&cli, id, force),
        Commands::Audit { last, ref since } => {
            credvault::cli::commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
    };

    if let Err(e) = result {
        credvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
