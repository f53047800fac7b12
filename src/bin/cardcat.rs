//! cardcat CLI: turn a scanner export into a storefront catalog file.

use cardcat::config::Config;
use cardcat::event::{Level, MemorySink, Tee, TracingSink};
use cardcat::inventory;
use cardcat::lookup::scryfall::ScryfallClient;
use cardcat::pipeline::Pipeline;
use cardcat::telemetry::{TelemetryConfig, init_telemetry};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cardcat", version, about = "Scanner export to storefront catalog")]
struct Cli {
    /// TOML config file (defaults to environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up every card and write the catalog file
    Convert {
        /// Scanner export (CSV with header row)
        input: PathBuf,
        /// Output path [default: <input>-catalog.csv]
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Cards per lookup call (1-75)
        #[arg(long)]
        batch_size: Option<usize>,
        /// Delay between batch dispatches, in milliseconds
        #[arg(long)]
        stagger_ms: Option<u64>,
        /// Wait before retrying a throttled batch, in milliseconds
        #[arg(long)]
        backoff_ms: Option<u64>,
        /// Card database base URL
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Parse the export and report accepted and skipped lines
    Check {
        /// Scanner export (CSV with header row)
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "cardcat".to_string(),
        default_filter: config.log_level.clone(),
    })?;

    match cli.command {
        Command::Convert {
            input,
            output,
            batch_size,
            stagger_ms,
            backoff_ms,
            api_url,
        } => {
            if let Some(n) = batch_size {
                config.batch_size = n;
            }
            if let Some(ms) = stagger_ms {
                config.dispatch_stagger_ms = ms;
            }
            if let Some(ms) = backoff_ms {
                config.retry_backoff_ms = ms;
            }
            if let Some(url) = api_url {
                config.api_base_url = url;
            }
            config.validate()?;
            let output = output.unwrap_or_else(|| default_output(&input));
            cmd_convert(&config, &input, &output).await
        }
        Command::Check { input } => cmd_check(&input).await,
    }
}

async fn cmd_convert(config: &Config, input: &Path, output: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(input).await?;
    let client = ScryfallClient::new(config)?;

    let memory = MemorySink::new();
    let tracing_sink = TracingSink;
    let sink = Tee(&memory, &tracing_sink);

    let result = Pipeline::from_config(config, &client, &sink).run(&text).await?;

    let state = &result.run.state;
    println!(
        "Run {}: {} cards reconciled, {} skipped lines, {} not found, {}/{} batches failed",
        result.run.id,
        result.run.catalog.len(),
        result.skipped.len(),
        state.not_found,
        state.failures.len(),
        state.total_batches,
    );
    for failure in &state.failures {
        println!("  batch {} failed: {}", failure.batch_index + 1, failure.reason);
    }
    let warnings = memory.count(Level::Warning);
    if warnings > 0 {
        println!("{warnings} warning(s), see log output");
    }

    if result.catalog.is_empty() {
        anyhow::bail!("catalog is empty, nothing written");
    }

    tokio::fs::write(output, &result.catalog.text).await?;
    println!("Wrote {} rows to {}", result.catalog.rows, output.display());
    Ok(())
}

async fn cmd_check(input: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(input).await?;
    let parsed = inventory::parse(&text);

    let copies: u64 = parsed.records.iter().map(|r| u64::from(r.quantity)).sum();
    println!(
        "{} rows accepted ({copies} copies), {} skipped",
        parsed.records.len(),
        parsed.skipped.len()
    );
    for skipped in &parsed.skipped {
        println!("  line {}: {}", skipped.line, skipped.reason);
    }
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "inventory".to_string());
    input.with_file_name(format!("{stem}-catalog.csv"))
}
