// Command bodies shared by the CLI entry point.
use crate::analyzer::options_view::{build_stacked, build_straddle, summarize};
use crate::analyzer::relative_strength_index;
use crate::config::AppConfig;
use crate::fetcher::{OptionChainProvider, PriceHistoryProvider, QuoteProvider};
use crate::model::{NoData, OptionsSummary, Quote, RsiReport};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum OptionsOutcome {
    Summary(OptionsSummary),
    NoData(NoData),
}

/// Snapshot plus RSI for `symbol`. Provider failures only null out the
/// affected fields.
pub async fn run_quote<P>(provider: &P, symbol: &str, config: &AppConfig) -> Quote
where
    P: QuoteProvider + PriceHistoryProvider,
{
    let history = config.history_request();
    let (snapshot, closes) = tokio::join!(
        provider.fetch_snapshot(symbol),
        provider.fetch_closes(symbol, &history),
    );

    let mut quote = Quote::empty(symbol);

    match snapshot {
        Ok(snapshot) => {
            quote.currency = snapshot.currency;
            quote.last_price = snapshot.last_price;
            quote.previous_close = snapshot.previous_close;
        }
        Err(e) => warn!("Failed to fetch quote for {}: {}", symbol, e),
    }

    match closes {
        Ok(closes) => {
            info!("Fetched {} closes for {}", closes.len(), symbol);
            quote.rsi = relative_strength_index(&closes, config.rsi_period);
            if quote.rsi.is_none() {
                info!(
                    "Not enough history for RSI({}) on {}",
                    config.rsi_period, symbol
                );
            }
        }
        Err(e) => warn!("Failed to compute RSI for {}: {}", symbol, e),
    }

    quote
}

pub async fn run_options<P>(provider: &P, symbol: &str, config: &AppConfig) -> OptionsOutcome
where
    P: OptionChainProvider,
{
    let contracts = match provider.fetch_chain(symbol, config.max_expirations).await {
        Ok(contracts) => contracts,
        Err(e) => {
            warn!("Failed to fetch option chain for {}: {}", symbol, e);
            Vec::new()
        }
    };
    info!("Fetched {} contracts for {}", contracts.len(), symbol);

    let straddle = build_straddle(&contracts);
    let stacked = build_stacked(&contracts);
    if straddle.is_empty() && stacked.is_empty() {
        return OptionsOutcome::NoData(NoData {
            symbol: symbol.to_string(),
            error: "no data",
        });
    }

    OptionsOutcome::Summary(summarize(symbol, &straddle, &stacked, config.preview_rows))
}

pub fn run_rsi(closes: &[f64], period: i64) -> RsiReport {
    RsiReport {
        period,
        count: closes.len(),
        rsi: relative_strength_index(closes, period),
    }
}
