mod analyzer;
mod commands;
mod config;
mod fetcher;
mod model;
mod normalizer;
mod parser;
mod utils;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use commands::{OptionsOutcome, run_options, run_quote, run_rsi};
use config::{AppConfig, load_config};
use fetcher::YahooClient;
use normalizer::normalize_symbol;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_USAGE: u8 = 1;
const EXIT_NO_DATA: u8 = 2;

#[derive(Parser)]
#[command(name = "quote-scout", about = "Fetch quotes and option chains, compute RSI")]
struct Args {
    /// Path to a JSON config file (defaults to ./quote-scout.json when present)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print currency, last price, previous close and RSI for a symbol
    Quote { symbol: String },
    /// Print straddle and stacked option-chain previews for a symbol
    Options { symbol: String },
    /// Compute RSI over closes given on the command line, oldest first
    Rsi {
        /// Lookback period; overrides the config value
        #[arg(short, long, allow_negative_numbers = true)]
        period: Option<i64>,
        #[arg(required = true, allow_negative_numbers = true, value_parser = parse_close)]
        closes: Vec<f64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let config = match load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match args.command {
        Command::Quote { symbol } => {
            let Some(symbol) = symbol_or_usage(&symbol) else {
                return ExitCode::from(EXIT_USAGE);
            };
            let Some(client) = client_or_log(&config) else {
                return ExitCode::from(EXIT_USAGE);
            };
            info!("Fetching quote for {}", symbol);
            let quote = run_quote(&client, &symbol, &config).await;
            print_json(&quote)
        }
        Command::Options { symbol } => {
            let Some(symbol) = symbol_or_usage(&symbol) else {
                return ExitCode::from(EXIT_USAGE);
            };
            let Some(client) = client_or_log(&config) else {
                return ExitCode::from(EXIT_USAGE);
            };
            info!("Fetching option chain for {}", symbol);
            match run_options(&client, &symbol, &config).await {
                OptionsOutcome::Summary(summary) => print_json(&summary),
                OptionsOutcome::NoData(no_data) => {
                    print_json(&no_data);
                    ExitCode::from(EXIT_NO_DATA)
                }
            }
        }
        Command::Rsi { period, closes } => {
            let report = run_rsi(&closes, period.unwrap_or(config.rsi_period));
            print_json(&report)
        }
    }
}

fn parse_close(raw: &str) -> Result<f64, String> {
    let close: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if close.is_finite() {
        Ok(close)
    } else {
        Err(format!("close must be a finite number, got {raw}"))
    }
}

fn symbol_or_usage(raw: &str) -> Option<String> {
    let symbol = normalize_symbol(raw);
    if symbol.is_none() {
        eprintln!("Usage: quote-scout <quote|options> <SYMBOL> (got {:?})", raw);
    }
    symbol
}

fn client_or_log(config: &AppConfig) -> Option<YahooClient> {
    YahooClient::new(config)
        .map_err(|e| error!("Failed to create HTTP client: {}", e))
        .ok()
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}
