// Utility functions
use chrono::DateTime;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Formats unix seconds as a `YYYY-MM-DD` date (UTC).
pub fn format_expiration(unix_seconds: i64) -> String {
    DateTime::from_timestamp(unix_seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| unix_seconds.to_string())
}

/// Writes a provider response that failed to parse into `folder` so it can be
/// inspected later. Failures are only logged.
pub fn save_debug_body(folder: &Path, kind: &str, symbol: &str, body: &str) {
    if let Err(e) = fs::create_dir_all(folder) {
        warn!("Failed to create debug folder: {}", e);
        return;
    }
    let filename = folder.join(format!("debug-{}-{}.json", kind, symbol.replace('.', "_")));
    if let Err(e) = fs::write(&filename, body) {
        warn!("Failed to write debug body: {}", e);
    } else {
        info!("Saved debug body: {}", filename.display());
    }
}
