//! RosterSync CLI - keep an identity store in step with a user roster CSV.

mod cli;
mod commands;
mod config;
mod logging;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use commands::sync::SyncOptions;
use config::ServeConfig;
use logging::{LogConfig, init_logging};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&LogConfig::from_args(&cli.logging)) {
        eprintln!("Error: failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Analyze { file, rows, json } => commands::analyze::run(file, rows, json),

        Commands::Preview {
            file,
            roster,
            mapping,
            json,
        } => commands::preview::run(file, roster, mapping, json),

        Commands::Sync {
            file,
            roster,
            mapping,
            execute,
            log_out,
            json,
        } => commands::sync::run(
            file,
            roster,
            mapping,
            &cli.store,
            SyncOptions {
                execute,
                log_out,
                json,
            },
        ),

        Commands::Serve {
            roster,
            host,
            port,
            cors_origins,
            max_upload_bytes,
            allow_execute,
        } => commands::serve::run(
            roster,
            &cli.store,
            ServeConfig {
                host,
                port,
                cors_origins,
                max_upload_bytes,
                allow_execute,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
