use anyhow::{anyhow, Context, Result};
use clap::Parser;
use person_lookup::environment::Settings;
use person_lookup::{FieldMapping, PersonResolver, Record};
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about = "Resolve scraped profile records into person matches", long_about = None)]
struct Cli {
    /// Input records: a JSON array or one JSON object per line
    #[arg(short, long)]
    input: PathBuf,

    /// Field mapping JSON file (defaults to FIELD_MAPPING_PATH)
    #[arg(short, long)]
    mapping: Option<PathBuf>,

    /// Where to write results (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    person_lookup::logging::configure_logging();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let mapping_path = cli
        .mapping
        .or_else(|| settings.field_mapping_path.clone())
        .ok_or_else(|| anyhow!("No field mapping given: pass --mapping or set FIELD_MAPPING_PATH"))?;
    let mapping = FieldMapping::load(&mapping_path)?;
    info!("Loaded field mapping from {}", mapping_path.display());

    let records = read_records(&cli.input)?;
    info!("Loaded {} record(s) from {}", records.len(), cli.input.display());

    let resolver = PersonResolver::from_configs(
        settings.pipl_config(),
        settings.geocoder_config(),
        mapping,
    )
    .context("Failed to set up API clients")?;

    let mut results = Vec::with_capacity(records.len());
    let (mut matched, mut failed) = (0usize, 0usize);

    for (index, record) in records.iter().enumerate() {
        match resolver.lookup(record).await {
            Ok(outcome) => {
                if !outcome.is_empty() {
                    matched += 1;
                }
                results.push(json!({ "index": index, "matches": outcome.into_matches() }));
            }
            Err(err) => {
                failed += 1;
                error!("Record {} failed: {}", index, err);
                results.push(json!({ "index": index, "error": err.to_string() }));
            }
        }
    }

    let rendered = serde_json::to_string_pretty(&results)?;
    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write results to {}", path.display()))?,
        None => writeln!(io::stdout(), "{}", rendered)?,
    }

    info!(
        "Processed {} record(s): {} with matches, {} failed",
        records.len(),
        matched,
        failed
    );
    Ok(())
}

/// Accepts either a JSON array of objects or JSON lines.
fn read_records(path: &Path) -> Result<Vec<Record>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input {}", path.display()))?;

    let values: Vec<Value> = if text.trim_start().starts_with('[') {
        serde_json::from_str(&text).context("Input is not a valid JSON array")?
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).with_context(|| format!("Invalid JSON on line {}", n + 1))
            })
            .collect::<Result<_>>()?
    };

    values
        .into_iter()
        .enumerate()
        .map(|(n, value)| match value {
            Value::Object(record) => Ok(record),
            other => Err(anyhow!("Record {} is not a JSON object: {}", n, other)),
        })
        .collect()
}
