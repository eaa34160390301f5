pub mod traits;
pub mod yahoo;

pub use traits::{OptionChainProvider, PriceHistoryProvider, QuoteProvider};
pub use yahoo::YahooClient;
