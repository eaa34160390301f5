// Core structs: Quote, OptionContract, table rows and errors
use serde::Serialize;
use thiserror::Error;

/// Printed result of the `quote` command. Field order is alphabetical so the
/// JSON output has sorted keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub currency: Option<String>,
    pub last_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub rsi: Option<f64>,
    pub symbol: String,
}

impl Quote {
    pub fn empty(symbol: &str) -> Self {
        Self {
            currency: None,
            last_price: None,
            previous_close: None,
            rsi: None,
            symbol: symbol.to_string(),
        }
    }
}

/// Latest market snapshot as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSnapshot {
    pub currency: Option<String>,
    pub last_price: Option<f64>,
    pub previous_close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub range: String,
    pub interval: String,
}

impl Default for HistoryRequest {
    fn default() -> Self {
        Self {
            range: "6mo".into(),
            interval: "1d".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionContract {
    pub contract_symbol: String,
    pub option_type: OptionType,
    pub strike: f64,
    /// Unix seconds.
    pub expiration: i64,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
    pub in_the_money: Option<bool>,
}

/// Call and put quoted at the same expiration and strike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StraddleRow {
    pub expiration: String,
    pub strike: f64,
    pub call_symbol: Option<String>,
    pub call_last: Option<f64>,
    pub call_bid: Option<f64>,
    pub call_ask: Option<f64>,
    pub call_volume: Option<u64>,
    pub call_open_interest: Option<u64>,
    pub call_iv: Option<f64>,
    pub put_symbol: Option<String>,
    pub put_last: Option<f64>,
    pub put_bid: Option<f64>,
    pub put_ask: Option<f64>,
    pub put_volume: Option<u64>,
    pub put_open_interest: Option<u64>,
    pub put_iv: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedRow {
    pub expiration: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub contract_symbol: String,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
    pub in_the_money: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptionsPreview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub straddle_head: Option<Vec<StraddleRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacked_head: Option<Vec<StackedRow>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionsSummary {
    pub symbol: String,
    pub straddle_rows: usize,
    pub stacked_rows: usize,
    pub preview: OptionsPreview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoData {
    pub symbol: String,
    pub error: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiReport {
    pub period: i64,
    pub count: usize,
    pub rsi: Option<f64>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("provider error [{code}]: {description}")]
    Api { code: String, description: String },
    #[error("no data available")]
    DataUnavailable,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
