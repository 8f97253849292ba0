use crate::types::Market;
use tracing::{debug, warn};

/// Latest markets snapshot as handed over by the feed
pub struct SnapshotCache {
    markets: Vec<Market>,
    version: u64,
    last_update: i64,
    max_markets: usize,
}

impl SnapshotCache {
    pub fn new(max_markets: usize) -> Self {
        Self {
            markets: Vec::new(),
            version: 0,
            last_update: 0,
            max_markets,
        }
    }

    /// Replace the snapshot. Returns true if it differs from the previous one.
    pub fn apply_snapshot(&mut self, mut markets: Vec<Market>, fetched_at: i64) -> bool {
        if markets.len() > self.max_markets {
            warn!(
                "🗑️ Snapshot has {} markets, keeping first {} (cache full)",
                markets.len(),
                self.max_markets
            );
            markets.truncate(self.max_markets);
        }

        self.last_update = fetched_at;

        if markets == self.markets {
            debug!("Snapshot unchanged ({} markets)", markets.len());
            return false;
        }

        self.markets = markets;
        self.version += 1;
        true
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_update(&self) -> i64 {
        self.last_update
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fixtures::snapshot;
    use crate::types::MarketState;

    #[test]
    fn reports_changes_only() {
        let mut cache = SnapshotCache::new(10);
        assert!(cache.is_empty());

        assert!(cache.apply_snapshot(snapshot(), 1_000));
        assert_eq!(cache.version(), 1);
        assert_eq!(cache.len(), 2);

        assert!(!cache.apply_snapshot(snapshot(), 2_000));
        assert_eq!(cache.version(), 1);
        assert_eq!(cache.last_update(), 2_000);

        let mut changed = snapshot();
        changed[0].state = MarketState::Suspended;
        assert!(cache.apply_snapshot(changed, 3_000));
        assert_eq!(cache.version(), 2);
        assert_eq!(cache.markets()[0].state, MarketState::Suspended);
    }

    #[test]
    fn caps_market_count() {
        let mut cache = SnapshotCache::new(1);
        cache.apply_snapshot(snapshot(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.markets()[0].name, "MATCH_ODDS");
    }

    #[test]
    fn empty_snapshot_clears_markets() {
        let mut cache = SnapshotCache::new(10);
        cache.apply_snapshot(snapshot(), 1);
        assert!(cache.apply_snapshot(Vec::new(), 2));
        assert!(cache.is_empty());
    }
}
