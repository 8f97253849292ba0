use crate::board::{self, text, Board, ClickOutcome};
use crate::network::stream::{SelectRequest, SharedState};
use crate::types::Market;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct MarketsView<'a> {
    markets: &'a [Market],
}

#[derive(Serialize)]
struct BoardResponse<'a> {
    version: u64,
    timestamp: i64,
    board: Board<'a>,
}

/// Board for the current snapshot
pub async fn get_board(State(state): State<SharedState>) -> Response {
    let cache = state.cache.read().await;
    let response = Json(BoardResponse {
        version: cache.version(),
        timestamp: cache.last_update(),
        board: board::render(cache.markets()),
    })
    .into_response();
    response
}

pub async fn get_board_text(State(state): State<SharedState>) -> String {
    let cache = state.cache.read().await;
    let board = board::render(cache.markets());
    text::render_text(&board)
}

/// Raw cached snapshot, as received from the feed
pub async fn get_markets(State(state): State<SharedState>) -> Response {
    let cache = state.cache.read().await;
    let response = Json(MarketsView {
        markets: cache.markets(),
    })
    .into_response();
    response
}

pub async fn post_select(State(state): State<SharedState>, Json(req): Json<SelectRequest>) -> Response {
    let response = state.select(&req).await;
    if response.outcome == ClickOutcome::Missing {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "unknown market or outcome" })),
        )
            .into_response();
    }
    Json(response).into_response()
}

pub async fn get_last_selection(State(state): State<SharedState>) -> Response {
    match state.last_selection.read().await.clone() {
        Some(event) => Json(event).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Get current stats
pub async fn get_stats(State(state): State<SharedState>) -> impl IntoResponse {
    let markets_count = state.cache.read().await.len();
    let mut stats = state.stats.read().await.clone();
    stats.markets_count = markets_count;
    stats.uptime_seconds = state.started.elapsed().as_secs();
    Json(stats)
}
