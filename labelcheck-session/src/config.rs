//! Configuration from environment variables.
//!
//! Command-line flags override individual fields through the `with_*`
//! builders.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_STORE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// File name of the resumption database inside `state_dir`.
pub const STATE_DB_FILE: &str = "labelcheck-state.db";

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the sample store; API paths are joined onto it.
    pub store_url: Url,
    /// Directory for client-local state (SQLite database).
    /// Defaults to current working directory.
    pub state_dir: PathBuf,
    pub request_timeout: Duration,
    pub recording_enabled: bool,
    pub recording_log_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_url = parse_store_url(env::var("LABELCHECK_STORE_URL").ok())?;

        let state_dir = env::var("LABELCHECK_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let request_timeout = parse_timeout(env::var("LABELCHECK_TIMEOUT_SECS").ok())?;

        let recording_enabled = env::var("RECORDING_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let recording_log_path =
            env::var("RECORDING_LOG_PATH").unwrap_or_else(|_| "recordings.jsonl".to_string());

        Ok(Config {
            store_url,
            state_dir,
            request_timeout,
            recording_enabled,
            recording_log_path,
        })
    }

    /// Replace the store URL, e.g. from a command-line flag.
    pub fn with_store_url(mut self, raw: &str) -> Result<Self> {
        self.store_url = parse_store_url(Some(raw.to_string()))?;
        Ok(self)
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    pub fn state_db_path(&self) -> PathBuf {
        self.state_dir.join(STATE_DB_FILE)
    }
}

/// Parse the store base URL, falling back to the local default.
///
/// A trailing slash is added so relative API paths join under any path prefix.
pub fn parse_store_url(value: Option<String>) -> Result<Url> {
    let raw = value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_STORE_URL.to_string());
    let mut url = Url::parse(raw.trim())
        .with_context(|| format!("LABELCHECK_STORE_URL is not a valid URL: {}", raw))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub fn parse_timeout(value: Option<String>) -> Result<Duration> {
    let secs = match value.filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .context("LABELCHECK_TIMEOUT_SECS must be a whole number of seconds")?,
        None => DEFAULT_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_url_defaults_to_localhost() {
        let url = parse_store_url(None).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(parse_store_url(Some("  ".to_string())).unwrap(), url);
    }

    #[test]
    fn test_store_url_gains_trailing_slash() {
        let url = parse_store_url(Some("https://review.example.com/relabel".to_string())).unwrap();
        assert_eq!(url.as_str(), "https://review.example.com/relabel/");
        assert_eq!(
            url.join("api/files").unwrap().as_str(),
            "https://review.example.com/relabel/api/files"
        );
    }

    #[test]
    fn test_store_url_rejects_garbage() {
        assert!(parse_store_url(Some("not a url".to_string())).is_err());
    }

    #[test]
    fn test_timeout_parsing() {
        assert_eq!(parse_timeout(None).unwrap(), Duration::from_secs(30));
        assert_eq!(parse_timeout(Some("5".to_string())).unwrap(), Duration::from_secs(5));
        assert!(parse_timeout(Some("soon".to_string())).is_err());
    }

    #[test]
    fn test_state_db_path_is_inside_state_dir() {
        let config = Config {
            store_url: parse_store_url(None).unwrap(),
            state_dir: PathBuf::from("/var/lib/labelcheck"),
            request_timeout: Duration::from_secs(1),
            recording_enabled: false,
            recording_log_path: "recordings.jsonl".to_string(),
        };
        assert_eq!(
            config.state_db_path(),
            PathBuf::from("/var/lib/labelcheck/labelcheck-state.db")
        );
    }
}
