pub mod client;

use crate::error::Result;
use crate::network::stream::{snapshot_message, SharedState};
use client::FeedClient;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Polls the market API and keeps the snapshot cache current
pub struct FeedService {
    client: FeedClient,
    state: SharedState,
    interval: Duration,
}

impl FeedService {
    pub fn new(client: FeedClient, state: SharedState, interval: Duration) -> Self {
        Self {
            client,
            state,
            interval,
        }
    }

    pub async fn run(&mut self) {
        info!("📡 Starting market feed (every {:?})", self.interval);

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.run_cycle().await;
        }
    }

    /// One poll. A failed fetch is logged and counted; the cached snapshot
    /// stays as it was.
    async fn run_cycle(&mut self) {
        if let Err(e) = self.process_cycle().await {
            self.state.stats.write().await.fetch_errors += 1;
            error!("Error in market feed cycle: {}", e);
        }
    }

    async fn process_cycle(&mut self) -> Result<()> {
        let markets = self.client.fetch_markets().await?;
        let fetched_at = chrono::Utc::now().timestamp_millis();
        let count = markets.len();

        let update = {
            let mut cache = self.state.cache.write().await;
            if cache.apply_snapshot(markets, fetched_at) {
                Some(snapshot_message(&cache)?)
            } else {
                None
            }
        };

        {
            let mut stats = self.state.stats.write().await;
            stats.snapshots_received += 1;
            stats.last_fetch_ms = fetched_at;
            if update.is_some() {
                stats.snapshots_changed += 1;
            }
        }

        match update {
            Some(msg) => {
                debug!("Snapshot changed ({} markets), broadcasting board", count);
                let _ = self.state.tx.send(msg);
            }
            None => debug!("Snapshot unchanged ({} markets)", count),
        }

        Ok(())
    }
}
