//! Analyze command - show the shape of a CSV and the detected mapping.

use std::path::PathBuf;

use colored::Colorize;
use rostersync::{FieldType, RosterSync, SyncConfig};

pub fn run(file: PathBuf, rows: usize, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let sync = RosterSync::with_config(SyncConfig {
        preview_rows: rows,
        ..Default::default()
    });

    let (table, source) = sync.load_file(&file)?;
    let analysis = sync.analyze_table(&table, source);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Analyzed".cyan().bold(),
        file.display().to_string().white()
    );
    println!(
        "  {} rows, {} columns, encoding {}{}",
        analysis.total_rows.to_string().white().bold(),
        analysis.headers.len(),
        analysis.source.encoding,
        if analysis.source.used_fallback {
            " (lossy)".yellow().to_string()
        } else {
            String::new()
        }
    );
    println!();

    println!("{}", "Detected mapping:".yellow().bold());
    for field in FieldType::ALL {
        let column = analysis.auto_mapping.get(field);
        let label = match column.indices() {
            [] => "(not detected)".dimmed().to_string(),
            indices => indices
                .iter()
                .map(|&i| format!("{} [{}]", analysis.headers[i], i))
                .collect::<Vec<_>>()
                .join(" + ")
                .green()
                .to_string(),
        };
        println!("  {:12} {}", field.to_string(), label);
    }
    println!();

    println!("{}", "Column scores (name / email / position / department):".yellow().bold());
    for column in &analysis.columns {
        println!(
            "  [{:>2}] {:20} {:.2} / {:.2} / {:.2} / {:.2}",
            column.index,
            column.header,
            column.scores.name,
            column.scores.email,
            column.scores.position,
            column.scores.department
        );
    }
    println!();

    println!("{}", "Preview:".yellow().bold());
    println!("  {}", analysis.headers.join(" | ").bold());
    for row in &analysis.preview {
        println!("  {}", row.join(" | "));
    }
    if analysis.total_rows > analysis.preview.len() {
        println!(
            "  {}",
            format!("... {} more rows", analysis.total_rows - analysis.preview.len()).dimmed()
        );
    }

    Ok(())
}
