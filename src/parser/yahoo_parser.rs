// Yahoo Finance JSON parsing (chart and options endpoints)
use crate::model::{FetchError, OptionContract, OptionType, QuoteSnapshot};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Envelope<ChartData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    option_chain: Envelope<ChainData>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<Vec<T>>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ErrorOnly {
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    currency: Option<String>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainData {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<ExpirationBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpirationBlock {
    expiration_date: i64,
    #[serde(default)]
    calls: Vec<RawContract>,
    #[serde(default)]
    puts: Vec<RawContract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContract {
    contract_symbol: String,
    strike: f64,
    expiration: Option<i64>,
    last_price: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
    volume: Option<u64>,
    open_interest: Option<u64>,
    implied_volatility: Option<f64>,
    in_the_money: Option<bool>,
}

impl RawContract {
    fn into_contract(self, option_type: OptionType, fallback_expiration: i64) -> OptionContract {
        OptionContract {
            contract_symbol: self.contract_symbol,
            option_type,
            strike: self.strike,
            expiration: self.expiration.unwrap_or(fallback_expiration),
            last_price: self.last_price,
            bid: self.bid,
            ask: self.ask,
            volume: self.volume,
            open_interest: self.open_interest,
            implied_volatility: self.implied_volatility,
            in_the_money: self.in_the_money,
        }
    }
}

/// Contracts of one options response plus every expiration the provider lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainPage {
    pub expiration_dates: Vec<i64>,
    pub contracts: Vec<OptionContract>,
}

fn first_result<T>(envelope: Envelope<T>) -> Result<T, FetchError> {
    if let Some(error) = envelope.error {
        return Err(FetchError::Api {
            code: error.code,
            description: error.description,
        });
    }
    envelope
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or(FetchError::DataUnavailable)
}

/// Provider error carried by any response envelope (`chart`, `optionChain`,
/// `finance`), typically on a non-2xx status.
pub fn parse_error_body(json: &str) -> Option<FetchError> {
    let envelopes: HashMap<String, ErrorOnly> = serde_json::from_str(json).ok()?;
    envelopes
        .into_values()
        .find_map(|envelope| envelope.error)
        .map(|error| FetchError::Api {
            code: error.code,
            description: error.description,
        })
}

fn parse_chart(json: &str) -> Result<ChartData, FetchError> {
    let response: ChartResponse =
        serde_json::from_str(json).map_err(|e| FetchError::Parse(e.to_string()))?;
    first_result(response.chart)
}

/// Snapshot fields from a chart response. The previous close falls back to
/// the chart's own previous close when the regular one is missing.
pub fn parse_snapshot(json: &str) -> Result<QuoteSnapshot, FetchError> {
    let meta = parse_chart(json)?.meta;
    Ok(QuoteSnapshot {
        currency: meta.currency,
        last_price: meta.regular_market_price,
        previous_close: meta.previous_close.or(meta.chart_previous_close),
    })
}

/// Closing prices from a chart response, oldest first, with gaps dropped.
pub fn parse_closes(json: &str) -> Result<Vec<f64>, FetchError> {
    let data = parse_chart(json)?;
    let series = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or(FetchError::DataUnavailable)?;
    let closes: Vec<f64> = series
        .close
        .into_iter()
        .flatten()
        .filter(|c| c.is_finite())
        .collect();

    if closes.is_empty() {
        return Err(FetchError::DataUnavailable);
    }
    Ok(closes)
}

pub fn parse_option_chain(json: &str) -> Result<ChainPage, FetchError> {
    let response: OptionsResponse =
        serde_json::from_str(json).map_err(|e| FetchError::Parse(e.to_string()))?;
    let chain = first_result(response.option_chain)?;

    let mut contracts = Vec::new();
    for block in chain.options {
        let expiration = block.expiration_date;
        contracts.extend(
            block
                .calls
                .into_iter()
                .map(|c| c.into_contract(OptionType::Call, expiration)),
        );
        contracts.extend(
            block
                .puts
                .into_iter()
                .map(|c| c.into_contract(OptionType::Put, expiration)),
        );
    }

    Ok(ChainPage {
        expiration_dates: chain.expiration_dates,
        contracts,
    })
}
