//! WAGERBOOK — Personal Wagering Ledger & Performance Engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! imports the given history files into a fresh session ledger, and
//! prints the summary metrics and daily performance series. This binary
//! is a thin adapter: all semantics live in the library modules.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::File;
use tracing::{error, info, warn};

use wagerbook::config::{AppConfig, DEFAULT_CONFIG_FILE};
use wagerbook::export;
use wagerbook::ingest::{self, ImportSchema};
use wagerbook::ledger::Ledger;
use wagerbook::report::{self, AggregateMode, SummaryMetrics};

const BANNER: &str = r#"
 __        ___    ____ _____ ____  ____   ___   ___  _  __
 \ \      / / \  / ___| ____|  _ \| __ ) / _ \ / _ \| |/ /
  \ \ /\ / / _ \| | _ |  _| | |_) |  _ \| | | | | | | ' /
   \ V  V / ___ \ |_| | |___|  _ <| |_) | |_| | |_| | . \
    \_/\_/_/   \_\____|_____|_| \_\____/ \___/ \___/|_|\_\

  Personal Wagering Ledger & Performance Engine
  v0.1.0
"#;

const USAGE: &str = "\
USAGE:
  wagerbook [OPTIONS] <FILE>...

Imports bet history files, then prints summary metrics and the daily
performance series for the session.

OPTIONS:
  --schema <simple|settlement>  Column layout of the input files
                                (default: from config)
  --mtd                         Restrict the report to month-to-date
  --export <PATH>               Write the normalized ledger back out
  --config <PATH>               Config file (default: wagerbook.toml)
  -h, --help                    Show this help
";

struct CliArgs {
    files: Vec<String>,
    schema: Option<ImportSchema>,
    mtd: bool,
    export: Option<String>,
    config: String,
}

fn main() -> Result<()> {
    init_logging();

    let args = match parse_args()? {
        Some(args) => args,
        None => {
            print!("{USAGE}");
            return Ok(());
        }
    };

    let cfg = AppConfig::load_or_default(&args.config)?;
    let schema = args.schema.unwrap_or(cfg.import.default_schema);
    let mode = if args.mtd {
        AggregateMode::MonthToDate
    } else {
        cfg.report.mode
    };

    println!("{BANNER}");
    info!(%schema, %mode, files = args.files.len(), "Session starting");

    // -- Ingest ----------------------------------------------------------

    let mut ledger = Ledger::new();
    for path in &args.files {
        let file = File::open(path).with_context(|| format!("Failed to open {path}"))?;
        match ingest::normalize(file, schema) {
            Ok(batch) => {
                for row_error in &batch.row_errors {
                    warn!(%path, "{row_error}");
                }
                info!(%path, "{batch}");
                ledger.add_all(batch.bets)?;
            }
            Err(e) => {
                // Batch-level rejection is local to the file; later files
                // still import.
                error!(%path, error = %e, "Import rejected");
            }
        }
    }

    // -- Report ----------------------------------------------------------

    let today = Local::now().date_naive();
    let snapshot = ledger.snapshot();
    let summary = SummaryMetrics::compute(&snapshot, cfg.ledger.position_basis);
    let series = report::performance(&snapshot, mode, today);
    let currency = &cfg.ledger.currency;

    println!("Summary ({} bets, {currency})", ledger.len());
    println!("  Total position     {:>12.2}", summary.total_position);
    println!("  Total returns      {:>12.2}", summary.total_returns);
    println!("  Available credit   {:>12.2}", summary.available_credit);
    println!("  Win percentage     {:>11.1}%", summary.win_percentage);
    println!(
        "  Potential          {:>+12.2} / {:>+12.2}",
        summary.potential_win, -summary.potential_loss
    );

    if series.is_empty() {
        println!("\nNo dated activity to report ({mode}).");
    } else {
        println!("\nDaily performance ({mode})");
        for bucket in &series.realized {
            println!("  {bucket}");
        }
        for bucket in &series.projected {
            println!("  {bucket} [projected]");
        }
    }

    // -- Export ----------------------------------------------------------

    if let Some(path) = &args.export {
        export::export_to_path(&snapshot, path)?;
        println!("\nExported {} bet(s) to {path}", snapshot.len());
    }

    Ok(())
}

/// Parse argv by hand. Returns `None` when help was requested or no
/// input files were given.
fn parse_args() -> Result<Option<CliArgs>> {
    let mut args = CliArgs {
        files: Vec::new(),
        schema: None,
        mtd: false,
        export: None,
        config: DEFAULT_CONFIG_FILE.to_string(),
    };

    let mut argv = std::env::args().skip(1);
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--mtd" => args.mtd = true,
            "--schema" => {
                let value = argv.next().context("--schema requires a value")?;
                args.schema = Some(value.parse()?);
            }
            "--export" => {
                args.export = Some(argv.next().context("--export requires a value")?);
            }
            "--config" => {
                args.config = argv.next().context("--config requires a value")?;
            }
            flag if flag.starts_with('-') => {
                anyhow::bail!("Unknown option: {flag}\n\n{USAGE}");
            }
            _ => args.files.push(arg),
        }
    }

    if args.files.is_empty() {
        return Ok(None);
    }
    Ok(Some(args))
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wagerbook=info"));

    let json_logging = std::env::var("WAGERBOOK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
