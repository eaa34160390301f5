// Relative Strength Index with Wilder's smoothing.

pub const DEFAULT_RSI_PERIOD: i64 = 14;

/// RSI of `closes` (oldest first) over `period`.
///
/// Returns `None` when `period <= 0` or there are fewer than `period + 1`
/// closes. Averages are seeded with the mean of the first `period` gains and
/// losses, then smoothed as `avg = (avg * (period - 1) + x) / period` for
/// every later delta. A zero average loss yields exactly `100.0`, flat prices
/// included.
pub fn relative_strength_index(closes: &[f64], period: i64) -> Option<f64> {
    if period <= 0 {
        return None;
    }
    let window = usize::try_from(period).ok()?;
    if closes.len() <= window {
        return None;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let period_f = period as f64;
    let mut avg_gain = gains[..window].iter().sum::<f64>() / period_f;
    let mut avg_loss = losses[..window].iter().sum::<f64>() / period_f;

    for (gain, loss) in gains[window..].iter().zip(&losses[window..]) {
        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
