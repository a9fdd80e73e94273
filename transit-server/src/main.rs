use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use transit_server::facade::{CacheConfig, JourneyPlanner};
use transit_server::graph::GraphConfig;
use transit_server::planner::SearchConfig;
use transit_server::store::JsonStore;
use transit_server::web::{AppState, create_router};

/// How often to re-read the network data file (24 hours).
const RELOAD_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_path =
        std::env::var("TRANSIT_DATA_PATH").unwrap_or_else(|_| "network.json".to_string());

    let store = JsonStore::new(&data_path);
    let planner = JourneyPlanner::new(
        store,
        GraphConfig::default(),
        SearchConfig::default(),
        &CacheConfig::default(),
    );

    // First load. A failure leaves the planner empty but serving; the
    // periodic reload below will pick the data up once it appears.
    planner.reload().await;

    let state = AppState::new(planner);

    // Refresh the network data periodically.
    let reload_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RELOAD_INTERVAL);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            reload_state.planner.reload().await;
        }
    });

    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("Transit journey planner listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health                        - Health check");
    println!("  POST /api/v1/route                  - Plan between coordinates");
    println!("  POST /api/v1/route/stops            - Plan between stops");
    println!("  GET  /api/v1/stops/search           - Stop-name autocomplete");
    println!("  GET  /api/v1/stops/nearby           - Stops near a point");
    println!("  POST /api/v1/graph/algorithm-steps  - Search trace");
    println!("  GET  /api/v1/graph/stats            - Network counters");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
