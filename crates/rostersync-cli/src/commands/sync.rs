//! Sync command - reconcile and apply, dry run unless `--execute`.

use std::fs::File;
use std::path::PathBuf;

use colored::Colorize;
use rostersync::{InMemoryStore, Roster, RosterSync, SyncResult};

use crate::cli::{MappingArgs, RosterArgs, StoreArgs};

pub struct SyncOptions {
    pub execute: bool,
    pub log_out: Option<PathBuf>,
    pub json: bool,
}

pub fn run(
    file: PathBuf,
    roster: RosterArgs,
    mapping: MappingArgs,
    store: &StoreArgs,
    options: SyncOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let sync = RosterSync::new();
    let (table, _source) = sync.load_file(&file)?;
    let roster = Roster::load(&roster.roster)?;
    let mapping = mapping.resolve(&sync, &table)?;

    let outcome = if options.execute {
        let store = store.build_store()?.ok_or(
            "Live sync needs an identity store: pass --store-url or set ROSTERSYNC_STORE_URL",
        )?;
        sync.execute_sync(&table, &mapping, &roster, &store, false)
    } else {
        // Nothing is written on a dry run; the store is never called.
        let store = InMemoryStore::from_roster(&roster);
        sync.execute_sync(&table, &mapping, &roster, &store, true)
    };

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            // Report what was written before the store went away.
            if let Some(partial) = e.partial_result() {
                eprintln!("{}", "Sync aborted, partial result:".red().bold());
                report(partial, &options)?;
            }
            return Err(e.into());
        }
    };

    report(&result, &options)?;

    if result.is_success() {
        Ok(())
    } else {
        Err(format!("{} operation(s) failed", result.errors.len()).into())
    }
}

fn report(result: &SyncResult, options: &SyncOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &options.log_out {
        result.write_log_csv(File::create(path)?)?;
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_result(result);
        if let Some(path) = &options.log_out {
            println!("Sync log written to {}", path.display());
        }
    }
    Ok(())
}

fn print_result(result: &SyncResult) {
    let heading = if result.dry_run {
        "Dry run (no changes written):".yellow().bold()
    } else {
        "Sync complete:".green().bold()
    };
    println!("{}", heading);
    println!("  Added:   {}", result.added.to_string().green());
    println!("  Updated: {}", result.updated.to_string().blue());
    println!("  Deleted: {}", result.deleted.to_string().red());

    let elapsed = result.end_time - result.start_time;
    println!("  Took:    {} ms", elapsed.num_milliseconds());

    if !result.errors.is_empty() {
        println!();
        println!("{}", "Errors:".red().bold());
        for failure in &result.errors {
            println!("  {} {}: {}", failure.operation, failure.email, failure.error);
        }
    }

    if result.dry_run {
        println!();
        println!("Run again with {} to apply.", "--execute".bold());
    }
}
