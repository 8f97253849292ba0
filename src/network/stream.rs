use crate::board::{self, Rank};
use crate::cache::SnapshotCache;
use crate::error::Result;
use crate::types::{BoardStats, Market, Selection, SelectResponse, SelectionEvent, Side, WsMessage};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub tx: broadcast::Sender<WsMessage>,
    pub cache: Arc<RwLock<SnapshotCache>>,
    pub stats: RwLock<BoardStats>,
    pub client_count: RwLock<usize>,
    /// Last forwarded click, kept for the page's feedback line
    pub last_selection: RwLock<Option<SelectionEvent>>,
    pub started: Instant,
}

impl AppState {
    pub fn new(tx: broadcast::Sender<WsMessage>, cache: Arc<RwLock<SnapshotCache>>) -> Self {
        Self {
            tx,
            cache,
            stats: RwLock::new(BoardStats::default()),
            client_count: RwLock::new(0),
            last_selection: RwLock::new(None),
            started: Instant::now(),
        }
    }

    pub async fn increment_clients(&self) {
        let mut count = self.client_count.write().await;
        *count += 1;
        let mut stats = self.stats.write().await;
        stats.ws_clients = *count;
    }

    pub async fn decrement_clients(&self) {
        let mut count = self.client_count.write().await;
        *count = count.saturating_sub(1);
        let mut stats = self.stats.write().await;
        stats.ws_clients = *count;
    }

    /// Run the click contract against the current snapshot and record the
    /// forwarded selection, if any.
    pub async fn select(&self, req: &SelectRequest) -> SelectResponse {
        let (outcome, event) = {
            let cache = self.cache.read().await;
            let board = board::render(cache.markets());
            let mut event = None;

            let outcome = match board.locate(&req.market_id, &req.outcome, req.side, req.rank) {
                Some(addr) => {
                    let mut on_select =
                        |selection: &Selection, market: &Market| event = Some(SelectionEvent::new(selection, market));
                    board.click(&addr, Some(&mut on_select))
                }
                None => board::ClickOutcome::Missing,
            };
            (outcome, event)
        };

        if let Some(event) = &event {
            self.record_selection(event.clone()).await;
        }

        SelectResponse {
            forwarded: event.is_some(),
            outcome,
            event,
        }
    }

    async fn record_selection(&self, event: SelectionEvent) {
        info!(
            "🎯 Selection forwarded: {} / {} {:?} @ {:?}",
            event.market_name, event.outcome, event.side, event.odds
        );
        *self.last_selection.write().await = Some(event.clone());
        self.stats.write().await.selections_forwarded += 1;
        let _ = self.tx.send(WsMessage::Selection { event });
    }
}

/// Identifies a board cell by stable keys rather than grid position
#[derive(Debug, Clone, Deserialize)]
pub struct SelectRequest {
    pub market_id: String,
    pub outcome: String,
    pub side: Side,
    pub rank: Rank,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientRequest {
    Select(SelectRequest),
}

/// Current board as a WebSocket message
pub fn snapshot_message(cache: &SnapshotCache) -> Result<WsMessage> {
    let board = board::render(cache.markets());
    Ok(WsMessage::BoardSnapshot {
        version: cache.version(),
        timestamp: cache.last_update(),
        board: serde_json::to_value(&board)?,
    })
}

type WsSender = Arc<tokio::sync::Mutex<futures::stream::SplitSink<WebSocket, Message>>>;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (sender, mut receiver) = socket.split();
    let mut rx = state.tx.subscribe();

    state.increment_clients().await;
    info!("👤 WebSocket client connected");

    let sender: WsSender = Arc::new(tokio::sync::Mutex::new(sender));
    let sender_clone = sender.clone();

    let initial = {
        let cache = state.cache.read().await;
        snapshot_message(&cache)
    };
    match initial {
        Ok(msg) => {
            if !send_json(&sender, &msg).await {
                state.decrement_clients().await;
                return;
            }
        }
        Err(e) => warn!("Failed to build board snapshot: {}", e),
    }

    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(msg) => {
                            if !send_json(&sender_clone, &msg).await {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("WebSocket client lagged, skipped {} messages", skipped);
                        }
                        Err(_) => break,
                    }
                }
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(30)) => {
                    // Send ping to keep connection alive
                    let mut s = sender_clone.lock().await;
                    if s.send(Message::Ping(vec![])).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Text(text) = msg {
            match serde_json::from_str::<ClientRequest>(&text) {
                Ok(ClientRequest::Select(req)) => {
                    let response = state.select(&req).await;
                    if !send_json(&sender, &WsMessage::SelectResult { response }).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to parse client request: {}", e);
                }
            }
        }
    }

    send_task.abort();
    state.decrement_clients().await;
    info!("👤 WebSocket client disconnected");
}

async fn send_json(sender: &WsSender, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => {
            let mut s = sender.lock().await;
            s.send(Message::Text(json)).await.is_ok()
        }
        Err(e) => {
            warn!("Failed to serialize message: {}", e);
            true
        }
    }
}
