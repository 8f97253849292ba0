use crate::board::ClickOutcome;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Side of a quoted price. Anything other than back/lay decodes as `Unknown`
/// and is never placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Back,
    Lay,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketState {
    Open,
    Suspended,
    Closed,
}

impl MarketState {
    pub fn is_open(self) -> bool {
        matches!(self, MarketState::Open)
    }

    pub fn label(self) -> &'static str {
        match self {
            MarketState::Open => "OPEN",
            MarketState::Suspended => "SUSPENDED",
            MarketState::Closed => "CLOSED",
        }
    }
}

impl Default for MarketState {
    fn default() -> Self {
        MarketState::Suspended
    }
}

// Feeds send "OPEN", "open", "Suspended"... anything unrecognised is treated
// as not open.
impl<'de> Deserialize<'de> for MarketState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let state = match value.as_str().map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "open" => MarketState::Open,
            Some(s) if s == "closed" => MarketState::Closed,
            _ => MarketState::Suspended,
        };
        Ok(state)
    }
}

/// One quoted price for one outcome of one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub odds: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub stake: Option<f64>,
    #[serde(default = "unknown_side", deserialize_with = "lenient_side")]
    pub side: Side,
    #[serde(default, alias = "gstatus", deserialize_with = "suspension_flag")]
    pub suspended: bool,
}

impl Selection {
    /// Odds if this selection can occupy a ladder slot: a known side, and
    /// finite non-negative odds and stake.
    pub fn priced_odds(&self) -> Option<f64> {
        if self.side == Side::Unknown || self.name.is_empty() {
            return None;
        }
        let odds = self.odds.filter(|o| o.is_finite() && *o >= 0.0)?;
        self.stake.filter(|s| s.is_finite() && *s >= 0.0)?;
        Some(odds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default)]
    pub state: MarketState,
    #[serde(rename = "minStake", default, deserialize_with = "lenient_f64")]
    pub min_stake: Option<f64>,
    #[serde(rename = "maxStake", default, deserialize_with = "lenient_f64")]
    pub max_stake: Option<f64>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub selections: Vec<Selection>,
}

/// Body returned by the market-odds API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketsResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub markets: Vec<Market>,
}

/// Emitted whenever a click on a live cell is forwarded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub market_id: String,
    pub market_name: String,
    pub selection_id: String,
    pub outcome: String,
    pub side: Side,
    pub odds: Option<f64>,
    pub stake: Option<f64>,
    pub selected_at: i64,
}

impl SelectionEvent {
    pub fn new(selection: &Selection, market: &Market) -> Self {
        Self {
            market_id: market.id.clone(),
            market_name: market.name.clone(),
            selection_id: selection.id.clone(),
            outcome: selection.name.clone(),
            side: selection.side,
            odds: selection.odds,
            stake: selection.stake,
            selected_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Reply to a click request, over HTTP or WebSocket
#[derive(Debug, Clone, Serialize)]
pub struct SelectResponse {
    pub forwarded: bool,
    pub outcome: ClickOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<SelectionEvent>,
}

/// WebSocket message to clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    BoardSnapshot {
        version: u64,
        timestamp: i64,
        board: Value,
    },
    Selection {
        event: SelectionEvent,
    },
    SelectResult {
        response: SelectResponse,
    },
}

/// Stats for monitoring
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoardStats {
    pub markets_count: usize,
    pub snapshots_received: u64,
    pub snapshots_changed: u64,
    pub fetch_errors: u64,
    pub selections_forwarded: u64,
    pub ws_clients: usize,
    pub last_fetch_ms: i64,
    pub uptime_seconds: u64,
}

fn unknown_side() -> Side {
    Side::Unknown
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

fn lenient_side<'de, D>(deserializer: D) -> Result<Side, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let side = match value.as_str().map(|s| s.trim().to_ascii_lowercase()) {
        Some(s) if s == "back" => Side::Back,
        Some(s) if s == "lay" => Side::Lay,
        _ => Side::Unknown,
    };
    Ok(side)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

// null or a non-array is an empty list; entries that fail to decode are skipped.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

// Prices arrive as numbers or numeric strings; anything else is dropped.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn suspension_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("suspended") || s.eq_ignore_ascii_case("closed")
        }
        Value::Number(n) => n.as_i64().map(|n| n != 0).unwrap_or(false),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_markets_payload() {
        let body = json!({
            "markets": [{
                "id": 17,
                "name": "MATCH_ODDS",
                "state": "OPEN",
                "minStake": 100,
                "maxStake": "50000",
                "selections": [
                    { "id": "a1", "name": "St. Lucia Kings", "odds": 1.86, "stake": 1200.0, "side": "back" },
                    { "id": 2, "name": "St. Lucia Kings", "odds": "1.9", "stake": 300, "side": "lay", "gstatus": "SUSPENDED" }
                ]
            }]
        });

        let parsed: MarketsResponse = serde_json::from_value(body).unwrap();
        let market = &parsed.markets[0];
        assert_eq!(market.id, "17");
        assert_eq!(market.state, MarketState::Open);
        assert_eq!(market.min_stake, Some(100.0));
        assert_eq!(market.max_stake, Some(50000.0));
        assert_eq!(market.selections[0].side, Side::Back);
        assert!(!market.selections[0].suspended);
        assert_eq!(market.selections[1].id, "2");
        assert_eq!(market.selections[1].odds, Some(1.9));
        assert!(market.selections[1].suspended);
    }

    #[test]
    fn tolerates_malformed_selections() {
        let body = json!({
            "id": "m", "name": "Bookmaker", "state": "halted",
            "selections": [
                { "id": "x", "name": "Yes", "side": "both", "odds": 2.0, "stake": 5 },
                { "id": "y", "name": "Yes", "side": "back" },
                { "id": "z", "name": "Yes", "side": "lay", "odds": -1.0, "stake": 5 }
            ]
        });

        let market: Market = serde_json::from_value(body).unwrap();
        assert_eq!(market.state, MarketState::Suspended);
        assert_eq!(market.selections[0].side, Side::Unknown);
        assert!(market.selections.iter().all(|s| s.priced_odds().is_none()));
    }

    #[test]
    fn null_fields_do_not_drop_the_snapshot() {
        let body = json!({
            "markets": [
                {
                    "id": "1.2345", "name": "MATCH_ODDS", "state": "OPEN",
                    "selections": [
                        { "id": "a", "name": "St. Lucia Kings", "odds": 1.86, "stake": 1200, "side": "back" },
                        { "id": "b", "name": null, "odds": 1.9, "stake": 50, "side": "lay" },
                        "garbage",
                        null
                    ]
                },
                { "id": "bm-1", "name": null, "state": "open", "selections": null },
                42
            ]
        });

        let parsed: MarketsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.markets.len(), 2);

        let match_odds = &parsed.markets[0];
        assert_eq!(match_odds.selections.len(), 2);
        assert_eq!(match_odds.selections[0].priced_odds(), Some(1.86));
        assert_eq!(match_odds.selections[1].name, "");
        assert!(match_odds.selections[1].priced_odds().is_none());

        assert_eq!(parsed.markets[1].name, "");
        assert!(parsed.markets[1].selections.is_empty());
    }

    #[test]
    fn null_markets_is_empty() {
        let parsed: MarketsResponse = serde_json::from_str(r#"{"markets": null}"#).unwrap();
        assert!(parsed.markets.is_empty());
    }

    #[test]
    fn side_is_case_insensitive() {
        let body = json!([
            { "id": "1", "name": "A", "side": "BACK" },
            { "id": "2", "name": "A", "side": "Lay" },
            { "id": "3", "name": "A", "side": " back " },
            { "id": "4", "name": "A", "side": 1 }
        ]);
        let selections: Vec<Selection> = serde_json::from_value(body).unwrap();
        let sides: Vec<Side> = selections.iter().map(|s| s.side).collect();
        assert_eq!(sides, vec![Side::Back, Side::Lay, Side::Back, Side::Unknown]);
    }

    #[test]
    fn zero_odds_are_priced() {
        let s = Selection {
            id: "1".into(),
            name: "Yes".into(),
            odds: Some(0.0),
            stake: Some(0.0),
            side: Side::Back,
            suspended: true,
        };
        assert_eq!(s.priced_odds(), Some(0.0));
    }

    #[test]
    fn missing_markets_key_is_empty() {
        let parsed: MarketsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.markets.is_empty());
    }
}
