use crate::config::Config;
use crate::error::{BoardError, Result};
use crate::types::{Market, MarketsResponse};
use reqwest::Client;
use tracing::error;

/// Polls the market-odds API for `{ "markets": [...] }` snapshots
pub struct FeedClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl FeedClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            url: config.markets_url.clone(),
            api_key: config.markets_api_key.clone(),
        })
    }

    pub async fn fetch_markets(&self) -> Result<Vec<Market>> {
        let mut request = self.client.get(&self.url);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("Market API error: {} - Body: {}", status, text);
            return Err(BoardError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: MarketsResponse = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse market API response: {} - Body: {}", e, text);
            e
        })?;

        Ok(parsed.markets)
    }
}
