//! Roster Optimizer - Axum Server
//!
//! Run with: cargo run
//! Then: curl -s localhost:7860/demo-data/SMALL | curl -s -XPOST -H 'content-type: application/json' -d @- localhost:7860/optimize

use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use roster_optimizer::api;
use roster_optimizer::config::ServiceConfig;
use roster_optimizer::error::RosterResult;
use roster_optimizer::solver::{ConstraintSolver, MilpSolver};

#[tokio::main]
async fn main() -> RosterResult<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("roster_optimizer=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServiceConfig::from_env()?;
    let solver: Arc<dyn ConstraintSolver> = Arc::new(MilpSolver::new());

    #[cfg(feature = "console")]
    roster_optimizer::console::print_banner(solver.name());

    let state = Arc::new(api::AppState::new(config.clone(), solver));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        addr = %config.bind,
        max_timeout_secs = config.max_timeout_secs,
        relaxed_timeout_secs = config.relaxed_timeout_secs,
        "Server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
