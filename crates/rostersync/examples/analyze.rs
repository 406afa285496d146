//! Example: Analyze a user CSV and preview the sync against a roster.
//!
//! Usage:
//!   cargo run --example analyze -- <csv_path> [roster.json]

use std::env;
use std::path::Path;

use rostersync::{FieldType, Roster, RosterSync};

fn main() -> rostersync::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example analyze -- <csv_path> [roster.json]");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    let sync = RosterSync::new();
    let (table, source) = sync.load_file(path)?;
    let analysis = sync.analyze_table(&table, source);

    let separator = "=".repeat(60);
    println!("{}", separator);
    println!("RosterSync Analysis: {}", path.display());
    println!("{}", separator);
    println!("  Encoding: {}", analysis.source.encoding);
    println!("  Rows: {}", analysis.total_rows);
    println!("  Columns: {}", analysis.headers.join(", "));
    println!();

    println!("## Detected Mapping");
    for field in FieldType::ALL {
        println!("  {:12} {}", field, analysis.auto_mapping.get(field));
    }
    println!();

    if let Some(roster_path) = args.get(2) {
        let roster = Roster::load(roster_path)?;
        let preview = sync.preview_sync(&table, &analysis.auto_mapping, &roster)?;

        println!("## Sync Preview");
        println!("  Add:    {}", preview.summary.to_add);
        println!("  Update: {}", preview.summary.to_update);
        println!("  Delete: {}", preview.summary.to_delete);
        for update in &preview.update_users {
            let fields: Vec<&str> = update.changes.keys().map(|f| f.as_str()).collect();
            println!("    ~ {} ({})", update.email, fields.join(", "));
        }
    }

    Ok(())
}
