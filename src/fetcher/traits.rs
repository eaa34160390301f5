use crate::model::{FetchError, HistoryRequest, OptionContract, QuoteSnapshot};

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot, FetchError>;
}

/// Source of closing prices, oldest first.
#[async_trait::async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch_closes(&self, symbol: &str, req: &HistoryRequest) -> Result<Vec<f64>, FetchError>;
}

#[async_trait::async_trait]
pub trait OptionChainProvider: Send + Sync {
    /// Contracts for the nearest `max_expirations` expirations.
    async fn fetch_chain(
        &self,
        symbol: &str,
        max_expirations: usize,
    ) -> Result<Vec<OptionContract>, FetchError>;
}
