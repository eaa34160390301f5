// Analyzer module: the RSI indicator and the option-chain tables.

pub mod options_view;
pub mod rsi;

pub use rsi::{DEFAULT_RSI_PERIOD, relative_strength_index};
