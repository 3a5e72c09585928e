mod cli;
mod dates;
mod error;
mod fmt;
mod index;
mod loader;
mod logging;
mod matcher;
mod models;
mod reconciler;
mod schema;
mod settings;
mod writer;

use clap::Parser;

use cli::{Cli, Commands, ConfigCommands};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { run } => cli::check::run(&run),
        Commands::Periods { run } => cli::periods::run(&run),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set { key, value } => cli::config::set(&key, &value),
            ConfigCommands::Alias { header, field } => cli::config::alias(&header, &field),
        },
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
