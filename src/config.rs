use crate::error::{BoardError, Result};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const MIN_POLL_INTERVAL_MS: u64 = 250;

#[derive(Clone, Debug)]
pub struct Config {
    pub markets_url: String,
    pub markets_api_key: Option<String>,
    pub poll_interval_ms: u64,
    pub http_port: u16,
    pub max_markets: usize,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let markets_url = lookup("MARKETS_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| BoardError::Config("MARKETS_URL must be set".to_string()))?;

        let poll_interval_ms: u64 = parse_or(&lookup, "POLL_INTERVAL_MS", 3000);

        Ok(Self {
            markets_url,
            markets_api_key: lookup("MARKETS_API_KEY").filter(|v| !v.is_empty()),
            poll_interval_ms: poll_interval_ms.max(MIN_POLL_INTERVAL_MS),
            http_port: parse_or(&lookup, "HTTP_PORT", 8081),
            max_markets: parse_or(&lookup, "MAX_MARKETS", 1000),
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} '{}', defaulting to {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("MARKETS_URL", "http://odds.local/markets")])).unwrap();
        assert_eq!(config.markets_url, "http://odds.local/markets");
        assert_eq!(config.markets_api_key, None);
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.http_port, 8081);
        assert_eq!(config.max_markets, 1000);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn markets_url_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, BoardError::Config(_)));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("MARKETS_URL", "http://odds.local"),
            ("HTTP_PORT", "not-a-port"),
            ("POLL_INTERVAL_MS", "10"),
            ("MAX_MARKETS", "25"),
            ("MARKETS_API_KEY", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.http_port, 8081);
        assert_eq!(config.poll_interval_ms, MIN_POLL_INTERVAL_MS);
        assert_eq!(config.max_markets, 25);
        assert_eq!(config.markets_api_key.as_deref(), Some("secret"));
    }
}
