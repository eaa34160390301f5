use crate::analyzer::DEFAULT_RSI_PERIOD;
use crate::model::{ConfigError, HistoryRequest};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "quote-scout.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Page that hands out the session cookie the crumb is bound to.
    pub cookie_url: String,
    /// Preset crumb for the options endpoint; fetched on demand when unset.
    pub crumb: Option<String>,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub history_range: String,
    pub history_interval: String,
    pub rsi_period: i64,
    pub preview_rows: usize,
    pub max_expirations: usize,
    pub debug_dump_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let history = HistoryRequest::default();
        Self {
            base_url: "https://query2.finance.yahoo.com".into(),
            cookie_url: "https://fc.yahoo.com".into(),
            crumb: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) QuoteScout/0.1".into(),
            timeout_seconds: 10,
            history_range: history.range,
            history_interval: history.interval,
            rsi_period: DEFAULT_RSI_PERIOD,
            preview_rows: 3,
            max_expirations: 1,
            debug_dump_dir: None,
        }
    }
}

impl AppConfig {
    pub fn history_request(&self) -> HistoryRequest {
        HistoryRequest {
            range: self.history_range.clone(),
            interval: self.history_interval.clone(),
        }
    }
}

/// Loads the config at `path`. When `path` is `None` the default location is
/// tried and a missing file falls back to built-in defaults; an explicit path
/// must exist.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p, true),
        None => (DEFAULT_CONFIG_PATH, false),
    };

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if !required && e.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_string(),
                source,
            });
        }
    };

    parse_config(&content).map_err(|source| ConfigError::Json {
        path: path.to_string(),
        source,
    })
}

fn parse_config(content: &str) -> Result<AppConfig, serde_json::Error> {
    serde_json::from_str(content)
}
