use crate::model::{
    OptionContract, OptionType, OptionsPreview, OptionsSummary, StackedRow, StraddleRow,
};
use crate::utils::format_expiration;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Joins calls and puts sharing an expiration and strike into one row.
/// Rows are ordered by expiration, then strike.
pub fn build_straddle(contracts: &[OptionContract]) -> Vec<StraddleRow> {
    let mut grouped: BTreeMap<(i64, u64), (Option<&OptionContract>, Option<&OptionContract>)> =
        BTreeMap::new();

    for contract in contracts.iter().filter(|c| c.strike.is_finite()) {
        let entry = grouped
            .entry((contract.expiration, strike_key(contract.strike)))
            .or_default();
        match contract.option_type {
            OptionType::Call => entry.0 = Some(contract),
            OptionType::Put => entry.1 = Some(contract),
        }
    }

    grouped
        .into_iter()
        .map(|((expiration, _), (call, put))| {
            let strike = call.or(put).map(|c| c.strike).unwrap_or_default();
            StraddleRow {
                expiration: format_expiration(expiration),
                strike,
                call_symbol: call.map(|c| c.contract_symbol.clone()),
                call_last: call.and_then(|c| c.last_price),
                call_bid: call.and_then(|c| c.bid),
                call_ask: call.and_then(|c| c.ask),
                call_volume: call.and_then(|c| c.volume),
                call_open_interest: call.and_then(|c| c.open_interest),
                call_iv: call.and_then(|c| c.implied_volatility),
                put_symbol: put.map(|c| c.contract_symbol.clone()),
                put_last: put.and_then(|c| c.last_price),
                put_bid: put.and_then(|c| c.bid),
                put_ask: put.and_then(|c| c.ask),
                put_volume: put.and_then(|c| c.volume),
                put_open_interest: put.and_then(|c| c.open_interest),
                put_iv: put.and_then(|c| c.implied_volatility),
            }
        })
        .collect()
}

/// One row per contract. Within an expiration calls come before puts, each
/// side sorted by strike.
pub fn build_stacked(contracts: &[OptionContract]) -> Vec<StackedRow> {
    let mut sorted: Vec<&OptionContract> = contracts.iter().collect();
    sorted.sort_by(|a, b| {
        a.expiration
            .cmp(&b.expiration)
            .then_with(|| type_rank(a.option_type).cmp(&type_rank(b.option_type)))
            .then_with(|| a.strike.partial_cmp(&b.strike).unwrap_or(Ordering::Equal))
    });

    sorted
        .into_iter()
        .map(|c| StackedRow {
            expiration: format_expiration(c.expiration),
            option_type: c.option_type,
            strike: c.strike,
            contract_symbol: c.contract_symbol.clone(),
            last_price: c.last_price,
            bid: c.bid,
            ask: c.ask,
            volume: c.volume,
            open_interest: c.open_interest,
            implied_volatility: c.implied_volatility,
            in_the_money: c.in_the_money,
        })
        .collect()
}

/// Row counts plus the first `preview_rows` rows of each non-empty table.
pub fn summarize(
    symbol: &str,
    straddle: &[StraddleRow],
    stacked: &[StackedRow],
    preview_rows: usize,
) -> OptionsSummary {
    let head = |len: usize| len.min(preview_rows);
    OptionsSummary {
        symbol: symbol.to_string(),
        straddle_rows: straddle.len(),
        stacked_rows: stacked.len(),
        preview: OptionsPreview {
            straddle_head: (!straddle.is_empty())
                .then(|| straddle[..head(straddle.len())].to_vec()),
            stacked_head: (!stacked.is_empty()).then(|| stacked[..head(stacked.len())].to_vec()),
        },
    }
}

fn type_rank(option_type: OptionType) -> u8 {
    match option_type {
        OptionType::Call => 0,
        OptionType::Put => 1,
    }
}

// Strikes are quoted to cents at most; mills keep adjacent strikes apart.
fn strike_key(strike: f64) -> u64 {
    (strike.max(0.0) * 1000.0).round() as u64
}
