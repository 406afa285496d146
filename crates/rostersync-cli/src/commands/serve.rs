//! Serve command - run the HTTP service.

use std::sync::Arc;

use colored::Colorize;
use rostersync::{IdentityStore, Roster, RosterSync};

use crate::cli::{RosterArgs, StoreArgs};
use crate::config::ServeConfig;
use crate::server::{app, state::AppState};

pub fn run(
    roster: RosterArgs,
    store: &StoreArgs,
    config: ServeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let roster = Roster::load(&roster.roster)?;

    // Built outside the runtime: the blocking HTTP client must not be
    // created or dropped on an async worker.
    let store: Option<Arc<dyn IdentityStore>> = match store.build_store()? {
        Some(rest) => Some(Arc::new(rest)),
        None => None,
    };

    if config.allow_execute && store.is_none() {
        println!(
            "{} --allow-execute has no effect without --store-url; every sync is a dry run",
            "Warning:".yellow()
        );
    }

    let state = AppState::new(RosterSync::new(), roster, store.clone(), config.allow_execute);

    let url = format!("http://{}:{}", config.host, config.port);
    println!();
    println!(
        "{} {}",
        "Starting rostersync service at".cyan().bold(),
        url.white().bold()
    );
    println!("  Known users: {}", state.roster.len());
    println!(
        "  Live sync:   {}",
        if state.live_sync_enabled() {
            "enabled".green()
        } else {
            "dry run only".yellow()
        }
    );
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, &config))?;
    drop(runtime);
    drop(store);

    Ok(())
}
