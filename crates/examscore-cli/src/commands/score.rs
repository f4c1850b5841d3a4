//! The `examscore score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use examscore_core::engine::CascadeOutcome;
use examscore_core::wire::parse_request;
use examscore_remote::build_engine;
use examscore_remote::config::load_config_from;

pub async fn execute(
    answers_path: PathBuf,
    config_path: Option<PathBuf>,
    format: String,
) -> Result<()> {
    if !matches!(format.as_str(), "table" | "json") {
        anyhow::bail!("unknown format: {format} (expected 'table' or 'json')");
    }

    let body = std::fs::read(&answers_path)
        .with_context(|| format!("failed to read {}", answers_path.display()))?;
    let pairs = parse_request(&body)
        .with_context(|| format!("invalid request file: {}", answers_path.display()))?;

    let config = load_config_from(config_path.as_deref())?;
    let engine = build_engine(&config)?;
    let outcome = engine.score(&pairs).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&outcome.result)?),
        _ => print_table(&outcome),
    }

    Ok(())
}

fn print_table(outcome: &CascadeOutcome) {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Similarity", "Score", "Max"]);

    for o in &outcome.result.outcomes {
        table.add_row(vec![
            Cell::new(&o.question_id),
            Cell::new(format!("{:.4}", o.similarity_score)),
            Cell::new(o.final_score),
            Cell::new(o.max_score),
        ]);
    }

    println!("{table}");
    println!(
        "Total: {}/{} (scored by {})",
        outcome.result.total_score, outcome.result.total_max_score, outcome.served_by
    );
    if let Some(reason) = &outcome.fallback_reason {
        println!("Remote scoring failed: {reason}");
    }
}
