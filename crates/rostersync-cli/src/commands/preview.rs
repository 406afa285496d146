//! Preview command - show the change set without touching the store.

use std::path::PathBuf;

use colored::Colorize;
use rostersync::{Roster, RosterSync, SyncPreview};

use crate::cli::{MappingArgs, RosterArgs};

pub fn run(
    file: PathBuf,
    roster: RosterArgs,
    mapping: MappingArgs,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let sync = RosterSync::new();
    let (table, _source) = sync.load_file(&file)?;
    let roster = Roster::load(&roster.roster)?;
    let mapping = mapping.resolve(&sync, &table)?;

    let preview = sync.preview_sync(&table, &mapping, &roster)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        print_preview(&preview);
    }

    Ok(())
}

/// Human-readable change set summary.
pub fn print_preview(preview: &SyncPreview) {
    let summary = &preview.summary;
    println!(
        "{} {} to add, {} to update, {} to delete",
        "Changes:".cyan().bold(),
        summary.to_add.to_string().green().bold(),
        summary.to_update.to_string().blue().bold(),
        summary.to_delete.to_string().red().bold()
    );

    if summary.to_add + summary.to_update + summary.to_delete == 0 {
        println!("  Roster is already up to date.");
        return;
    }

    if !preview.new_users.is_empty() {
        println!();
        println!("{}", "New users:".yellow().bold());
        for user in &preview.new_users {
            println!(
                "  {} {} {} ({} / {})",
                "+".green(),
                user.email,
                user.name,
                user.position,
                user.department
            );
        }
        print_more(summary.to_add, preview.new_users.len());
    }

    if !preview.update_users.is_empty() {
        println!();
        println!("{}", "Updated users:".yellow().bold());
        for update in &preview.update_users {
            println!("  {} {}", "~".blue(), update.email);
            for (field, change) in &update.changes {
                println!(
                    "      {:10} {} -> {}",
                    field.to_string(),
                    change.old.red(),
                    change.new.green()
                );
            }
        }
        print_more(summary.to_update, preview.update_users.len());
    }

    if !preview.delete_users.is_empty() {
        println!();
        println!("{}", "Deleted users:".yellow().bold());
        for user in &preview.delete_users {
            println!("  {} {} {}", "-".red(), user.email, user.name);
        }
        print_more(summary.to_delete, preview.delete_users.len());
    }
}

fn print_more(total: usize, shown: usize) {
    if total > shown {
        println!("  {}", format!("... and {} more", total - shown).dimmed());
    }
}
