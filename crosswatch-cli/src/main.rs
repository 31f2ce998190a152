//! Crosswatch CLI: analyze price series and manage pending conditions.
//!
//! Commands:
//! - `analyze`: scan a CSV price series for confirmed golden/death crosses
//! - `conditions list`: show pending conditions in a store file
//! - `conditions purge`: delete pending conditions on or before a date

mod logging;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

use crosswatch_core::data::{export_alerts_csv, load_csv};
use crosswatch_core::domain::Alert;
use crosswatch_core::store::{JsonlConditionStore, MemoryConditionStore, PrimaryConditionStore};
use crosswatch_core::{AnalyzeError, CrosswatchConfig, SignalConfirmationEngine};

#[derive(Parser)]
#[command(
    name = "crosswatch",
    about = "Crosswatch CLI: confirm moving-average crosses with RSI, MACD and Bollinger signals"
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a daily price series and print confirmed alerts.
    Analyze {
        /// Stock symbol the series belongs to.
        #[arg(long)]
        symbol: String,

        /// CSV file with date,open,high,low,close,volume columns.
        #[arg(long)]
        bars: PathBuf,

        /// JSONL condition store. Without it, pending conditions live only for this run.
        #[arg(long)]
        store: Option<PathBuf>,

        /// TOML config file. Defaults to built-in periods and weights.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Pending condition store commands.
    Conditions {
        #[command(subcommand)]
        action: ConditionsAction,
    },
}

#[derive(Subcommand)]
enum ConditionsAction {
    /// List pending conditions.
    List {
        /// JSONL condition store.
        #[arg(long)]
        store: PathBuf,

        /// Only this symbol.
        #[arg(long)]
        symbol: Option<String>,

        /// One JSON object per line instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete pending conditions that occurred on or before a date.
    Purge {
        /// JSONL condition store.
        #[arg(long)]
        store: PathBuf,

        /// Cutoff date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        before: String,

        /// Only this symbol.
        #[arg(long)]
        symbol: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            symbol,
            bars,
            store,
            config,
            format,
        } => run_analyze(&symbol, &bars, store.as_deref(), config.as_deref(), format),
        Commands::Conditions { action } => match action {
            ConditionsAction::List {
                store,
                symbol,
                json,
            } => run_list(&store, symbol.as_deref(), json),
            ConditionsAction::Purge {
                store,
                before,
                symbol,
            } => run_purge(&store, &before, symbol.as_deref()),
        },
    }
}

fn run_analyze(
    symbol: &str,
    bars_path: &Path,
    store_path: Option<&Path>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = match config_path {
        Some(path) => CrosswatchConfig::from_file(path)?,
        None => CrosswatchConfig::default(),
    };
    let bars = load_csv(bars_path)
        .with_context(|| format!("failed to load bars from {}", bars_path.display()))?;

    let mut store: Box<dyn PrimaryConditionStore> = match store_path {
        Some(path) => Box::new(
            JsonlConditionStore::open(path)
                .with_context(|| format!("failed to open store {}", path.display()))?,
        ),
        None => Box::new(MemoryConditionStore::new()),
    };

    let engine = SignalConfirmationEngine::from_config(&config)?;
    let alerts = match engine.analyze(&mut *store, &bars, symbol) {
        Ok(alerts) => alerts,
        Err(AnalyzeError::Store { source, alerts }) => {
            // These conditions are already gone from the store.
            if !alerts.is_empty() {
                print_alerts(&alerts, format)?;
            }
            return Err(anyhow::Error::new(source).context(format!(
                "condition store failed for {symbol} after {} confirmed alert(s)",
                alerts.len()
            )));
        }
        Err(e) => return Err(e.into()),
    };
    info!(symbol, bars = bars.len(), alerts = alerts.len(), "analysis complete");

    print_alerts(&alerts, format)
}

fn print_alerts(alerts: &[Alert], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if alerts.is_empty() {
                println!("No confirmed signals.");
            }
            for alert in alerts {
                println!("{alert}");
            }
        }
        OutputFormat::Json => {
            for alert in alerts {
                println!("{}", serde_json::to_string(alert)?);
            }
        }
        OutputFormat::Csv => print!("{}", export_alerts_csv(alerts)?),
    }
    Ok(())
}

fn run_list(store_path: &Path, symbol: Option<&str>, json: bool) -> Result<()> {
    let store = JsonlConditionStore::open(store_path)
        .with_context(|| format!("failed to open store {}", store_path.display()))?;
    let conditions = store.list(symbol)?;

    if json {
        for condition in &conditions {
            println!("{}", serde_json::to_string(condition)?);
        }
        return Ok(());
    }

    if conditions.is_empty() {
        println!("No pending conditions in {}", store_path.display());
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    println!("{:<6} {:<8} {:<14} {:<12} {:>8}", "Id", "Symbol", "Type", "Date", "Age");
    println!("{}", "-".repeat(52));
    for c in &conditions {
        println!(
            "{:<6} {:<8} {:<14} {:<12} {:>7}d",
            c.id.0,
            c.symbol,
            c.condition_type.to_string(),
            c.occurrence_date.to_string(),
            c.age_days(today)
        );
    }
    Ok(())
}

fn run_purge(store_path: &Path, before: &str, symbol: Option<&str>) -> Result<()> {
    let cutoff = NaiveDate::parse_from_str(before, "%Y-%m-%d")
        .with_context(|| format!("invalid --before date '{before}', expected YYYY-MM-DD"))?;
    let mut store = JsonlConditionStore::open(store_path)
        .with_context(|| format!("failed to open store {}", store_path.display()))?;

    let removed = store.purge_expired(symbol, cutoff)?;
    info!(removed, %cutoff, "purge complete");
    println!(
        "Removed {removed} condition(s) on or before {cutoff}; {} remaining.",
        store.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_defaults_to_text_and_memory_store() {
        let cli = Cli::try_parse_from([
            "crosswatch", "analyze", "--symbol", "AAPL", "--bars", "aapl.csv",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                symbol,
                store,
                format,
                ..
            } => {
                assert_eq!(symbol, "AAPL");
                assert!(store.is_none());
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn purge_requires_cutoff() {
        let result = Cli::try_parse_from([
            "crosswatch", "conditions", "purge", "--store", "conditions.jsonl",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn purge_rejects_malformed_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conditions.jsonl");
        let err = run_purge(&path, "10/06/2023", None).unwrap_err();
        assert!(err.to_string().contains("expected YYYY-MM-DD"));
    }
}
