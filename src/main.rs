use odds_board::cache::SnapshotCache;
use odds_board::config::Config;
use odds_board::feed::{client::FeedClient, FeedService};
use odds_board::network::{self, stream::AppState, stream::SharedState};
use odds_board::types::WsMessage;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    dotenvy::dotenv().ok();

    info!("🚀 Starting odds-board...");

    let config = Config::from_env()?;
    info!("📋 Configuration loaded (feed: {})", config.markets_url);

    let (ws_tx, _) = broadcast::channel::<WsMessage>(1000);
    let cache = Arc::new(RwLock::new(SnapshotCache::new(config.max_markets)));
    let state: SharedState = Arc::new(AppState::new(ws_tx, cache));

    // Poll the market API
    let client = FeedClient::new(&config)?;
    let mut feed = FeedService::new(client, state.clone(), config.poll_interval());
    tokio::spawn(async move {
        feed.run().await;
    });

    let app = network::router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    info!("🌐 Board server starting on {}", addr);
    info!("📊 Board at http://localhost:{}/board.txt", config.http_port);
    info!("✅ odds-board ready!");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
