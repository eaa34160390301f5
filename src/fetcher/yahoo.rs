use crate::config::AppConfig;
use crate::fetcher::traits::{OptionChainProvider, PriceHistoryProvider, QuoteProvider};
use crate::model::{FetchError, HistoryRequest, OptionContract, QuoteSnapshot};
use crate::parser::yahoo_parser::{self, ChainPage};
use crate::utils::save_debug_body;
use futures::future::join_all;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// HTTP client for the public Yahoo Finance chart and options endpoints.
///
/// The options endpoint wants a session cookie plus a matching crumb. Unless
/// one is configured, the crumb is fetched once on first use and reused for
/// the lifetime of the client.
pub struct YahooClient {
    client: Client,
    base_url: String,
    cookie_url: String,
    crumb: OnceCell<Option<String>>,
    debug_dump_dir: Option<PathBuf>,
}

impl YahooClient {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .cookie_store(true)
            .build()?;

        let crumb = match &config.crumb {
            Some(crumb) => OnceCell::new_with(Some(Some(crumb.clone()))),
            None => OnceCell::new(),
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie_url: config.cookie_url.clone(),
            crumb,
            debug_dump_dir: config.debug_dump_dir.clone(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }

    fn options_url(&self, symbol: &str) -> String {
        format!("{}/v7/finance/options/{}", self.base_url, symbol)
    }

    fn crumb_url(&self) -> String {
        format!("{}/v1/test/getcrumb", self.base_url)
    }

    async fn get_body(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        debug!("GET {} {:?}", url, query);
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            // Unknown symbols and rejected crumbs come back with an error body.
            let body = response.text().await.unwrap_or_default();
            return Err(yahoo_parser::parse_error_body(&body)
                .unwrap_or(FetchError::Status(status.as_u16())));
        }

        Ok(response.text().await?)
    }

    fn parsed<T>(
        &self,
        kind: &str,
        symbol: &str,
        body: &str,
        result: Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        if let (Err(FetchError::Parse(_)), Some(dir)) = (&result, &self.debug_dump_dir) {
            save_debug_body(dir, kind, symbol, body);
        }
        result
    }

    async fn crumb(&self) -> Option<&str> {
        self.crumb
            .get_or_init(|| async {
                match self.fetch_crumb().await {
                    Ok(crumb) => {
                        info!("Obtained provider crumb");
                        Some(crumb)
                    }
                    Err(e) => {
                        warn!("Failed to obtain provider crumb: {}", e);
                        None
                    }
                }
            })
            .await
            .as_deref()
    }

    async fn fetch_crumb(&self) -> Result<String, FetchError> {
        // Only the session cookie matters here; the status is usually 404.
        let cookie_response = self.client.get(&self.cookie_url).send().await?;
        debug!("Cookie endpoint answered {}", cookie_response.status());

        let crumb = self.get_body(&self.crumb_url(), &[]).await?;
        let crumb = crumb.trim();
        if crumb.is_empty() || crumb.starts_with('{') || crumb.starts_with('<') {
            return Err(FetchError::DataUnavailable);
        }
        Ok(crumb.to_string())
    }

    async fn fetch_chain_page(
        &self,
        symbol: &str,
        expiration: Option<i64>,
        crumb: Option<&str>,
    ) -> Result<ChainPage, FetchError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(crumb) = crumb {
            query.push(("crumb", crumb.to_string()));
        }
        if let Some(date) = expiration {
            query.push(("date", date.to_string()));
        }
        let body = self.get_body(&self.options_url(symbol), &query).await?;
        self.parsed("options", symbol, &body, yahoo_parser::parse_option_chain(&body))
    }
}

#[async_trait::async_trait]
impl QuoteProvider for YahooClient {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot, FetchError> {
        let query = [("range", "1d".to_string()), ("interval", "1d".to_string())];
        let body = self.get_body(&self.chart_url(symbol), &query).await?;
        self.parsed("snapshot", symbol, &body, yahoo_parser::parse_snapshot(&body))
    }
}

#[async_trait::async_trait]
impl PriceHistoryProvider for YahooClient {
    async fn fetch_closes(&self, symbol: &str, req: &HistoryRequest) -> Result<Vec<f64>, FetchError> {
        let query = [
            ("range", req.range.clone()),
            ("interval", req.interval.clone()),
        ];
        let body = self.get_body(&self.chart_url(symbol), &query).await?;
        self.parsed("chart", symbol, &body, yahoo_parser::parse_closes(&body))
    }
}

#[async_trait::async_trait]
impl OptionChainProvider for YahooClient {
    async fn fetch_chain(
        &self,
        symbol: &str,
        max_expirations: usize,
    ) -> Result<Vec<OptionContract>, FetchError> {
        let crumb = self.crumb().await;
        let first = self.fetch_chain_page(symbol, None, crumb).await?;
        let mut contracts = first.contracts;

        let extra: Vec<i64> = first
            .expiration_dates
            .into_iter()
            .filter(|date| !contracts.iter().any(|c| c.expiration == *date))
            .take(max_expirations.saturating_sub(1))
            .collect();

        let pages = join_all(
            extra
                .iter()
                .map(|date| self.fetch_chain_page(symbol, Some(*date), crumb)),
        )
        .await;

        for (date, page) in extra.iter().zip(pages) {
            match page {
                Ok(page) => contracts.extend(page.contracts),
                Err(e) => warn!("Skipping {} expiration {}: {}", symbol, date, e),
            }
        }

        Ok(contracts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    // 2024-01-19, 2024-01-26, 2024-02-02 00:00 UTC
    const JAN19: i64 = 1_705_622_400;
    const JAN26: i64 = 1_706_227_200;
    const FEB02: i64 = 1_706_832_000;

    fn client_for(server: &Server, tweak: impl FnOnce(&mut AppConfig)) -> YahooClient {
        let mut config = AppConfig {
            base_url: server.url(),
            cookie_url: format!("{}/cookie", server.url()),
            crumb: Some("abc".into()),
            timeout_seconds: 5,
            ..AppConfig::default()
        };
        tweak(&mut config);
        YahooClient::new(&config).unwrap()
    }

    fn chain_body(expiration: i64, strike: f64) -> String {
        serde_json::json!({
            "optionChain": {
                "result": [{
                    "underlyingSymbol": "AAPL",
                    "expirationDates": [JAN19, JAN26, FEB02],
                    "options": [{
                        "expirationDate": expiration,
                        "calls": [{ "contractSymbol": format!("AAPL{expiration}C"), "strike": strike, "lastPrice": 2.0 }],
                        "puts": [{ "contractSymbol": format!("AAPL{expiration}P"), "strike": strike, "lastPrice": 1.5 }]
                    }]
                }],
                "error": null
            }
        })
        .to_string()
    }

    #[test]
    fn urls_use_trimmed_base() {
        let config = AppConfig {
            base_url: "http://localhost:9/".into(),
            ..AppConfig::default()
        };
        let client = YahooClient::new(&config).unwrap();
        assert_eq!(client.chart_url("AAPL"), "http://localhost:9/v8/finance/chart/AAPL");
        assert_eq!(client.options_url("BRK.B"), "http://localhost:9/v7/finance/options/BRK.B");
        assert_eq!(client.crumb_url(), "http://localhost:9/v1/test/getcrumb");
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        let config = AppConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_seconds: 2,
            ..AppConfig::default()
        };
        let client = YahooClient::new(&config).unwrap();
        let result = client.fetch_closes("AAPL", &HistoryRequest::default()).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }

    #[tokio::test]
    async fn closes_come_from_chart_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v8/finance/chart/AAPL")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("range".into(), "6mo".into()),
                Matcher::UrlEncoded("interval".into(), "1d".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"chart":{"result":[{"meta":{"currency":"USD"},"indicators":{"quote":[{"close":[1.0,null,2.0]}]}}],"error":null}}"#)
            .create_async()
            .await;

        let client = client_for(&server, |_| {});
        let closes = client
            .fetch_closes("AAPL", &HistoryRequest::default())
            .await
            .unwrap();
        assert_eq!(closes, vec![1.0, 2.0]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v8/finance/chart/AAPL")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("service unavailable")
            .create_async()
            .await;

        let client = client_for(&server, |_| {});
        let result = client.fetch_snapshot("AAPL").await;
        assert!(matches!(result, Err(FetchError::Status(503))), "{result:?}");
    }

    #[tokio::test]
    async fn unknown_symbol_maps_to_provider_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v8/finance/chart/NOPE")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#)
            .create_async()
            .await;

        let client = client_for(&server, |_| {});
        match client.fetch_snapshot("NOPE").await {
            Err(FetchError::Api { code, .. }) => assert_eq!(code, "Not Found"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_crumb_maps_to_provider_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v7/finance/options/AAPL")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"finance":{"result":null,"error":{"code":"Unauthorized","description":"Invalid Crumb"}}}"#)
            .create_async()
            .await;

        let client = client_for(&server, |_| {});
        match client.fetch_chain("AAPL", 1).await {
            Err(FetchError::Api { description, .. }) => assert_eq!(description, "Invalid Crumb"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn chain_merges_extra_expirations_and_skips_failures() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v7/finance/options/AAPL")
            .match_query(Matcher::Regex("^crumb=abc$".into()))
            .with_status(200)
            .with_body(chain_body(JAN19, 185.0))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/v7/finance/options/AAPL")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("crumb".into(), "abc".into()),
                Matcher::UrlEncoded("date".into(), JAN26.to_string()),
            ]))
            .with_status(200)
            .with_body(chain_body(JAN26, 190.0))
            .create_async()
            .await;
        let third = server
            .mock("GET", "/v7/finance/options/AAPL")
            .match_query(Matcher::UrlEncoded("date".into(), FEB02.to_string()))
            .with_status(500)
            .create_async()
            .await;

        let client = client_for(&server, |_| {});
        let contracts = client.fetch_chain("AAPL", 3).await.unwrap();

        assert_eq!(contracts.len(), 4);
        assert_eq!(contracts.iter().filter(|c| c.expiration == JAN19).count(), 2);
        assert_eq!(contracts.iter().filter(|c| c.expiration == JAN26).count(), 2);
        second.assert_async().await;
        third.assert_async().await;
    }

    #[tokio::test]
    async fn chain_stops_at_expiration_limit() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v7/finance/options/AAPL")
            .match_query(Matcher::Regex("^crumb=abc$".into()))
            .with_status(200)
            .with_body(chain_body(JAN19, 185.0))
            .create_async()
            .await;
        let dated = server
            .mock("GET", "/v7/finance/options/AAPL")
            .match_query(Matcher::Regex("date=".into()))
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server, |_| {});
        let contracts = client.fetch_chain("AAPL", 1).await.unwrap();
        assert_eq!(contracts.len(), 2);
        dated.assert_async().await;
    }

    #[tokio::test]
    async fn crumb_is_fetched_once_and_sent() {
        let mut server = Server::new_async().await;
        let cookie = server
            .mock("GET", "/cookie")
            .with_status(404)
            .with_header("set-cookie", "A3=session; Path=/")
            .expect(1)
            .create_async()
            .await;
        let crumb = server
            .mock("GET", "/v1/test/getcrumb")
            .with_status(200)
            .with_body("xyz.Crumb")
            .expect(1)
            .create_async()
            .await;
        let chain = server
            .mock("GET", "/v7/finance/options/AAPL")
            .match_query(Matcher::UrlEncoded("crumb".into(), "xyz.Crumb".into()))
            .with_status(200)
            .with_body(chain_body(JAN19, 185.0))
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server, |cfg| cfg.crumb = None);
        assert_eq!(client.fetch_chain("AAPL", 1).await.unwrap().len(), 2);
        assert_eq!(client.fetch_chain("AAPL", 1).await.unwrap().len(), 2);

        cookie.assert_async().await;
        crumb.assert_async().await;
        chain.assert_async().await;
    }

    #[tokio::test]
    async fn unparsable_body_is_dumped() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v8/finance/chart/AAPL")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>consent wall</html>")
            .create_async()
            .await;

        let dir = std::env::temp_dir().join(format!("quote-scout-dump-{}", std::process::id()));
        let dump_dir = dir.clone();
        let client = client_for(&server, move |cfg| cfg.debug_dump_dir = Some(dump_dir));

        let result = client.fetch_closes("AAPL", &HistoryRequest::default()).await;
        assert!(matches!(result, Err(FetchError::Parse(_))));

        let dumped = std::fs::read_to_string(dir.join("debug-chart-AAPL.json")).unwrap();
        assert_eq!(dumped, "<html>consent wall</html>");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
