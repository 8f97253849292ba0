pub mod http;
pub mod stream;

use axum::{
    routing::{get, post},
    Router,
};
use stream::SharedState;
use tower_http::cors::CorsLayer;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/ws", get(stream::ws_handler))
        .route("/board", get(http::get_board))
        .route("/board.txt", get(http::get_board_text))
        .route("/markets", get(http::get_markets))
        .route("/select", post(http::post_select))
        .route("/selection/last", get(http::get_last_selection))
        .route("/stats", get(http::get_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
