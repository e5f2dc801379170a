use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use heard_api::config::Args;
use heard_api::handlers;
use heard_api::rate_limit::{ActionKind, RateLimiter};
use heard_api::state::AppState;
use heard_api::store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();
    let confidence = args.confidence()?;

    let state = Arc::new(AppState {
        store: Store::new(),
        rate_limiter: RateLimiter::new(args.limits()),
        confidence,
        identity_salt: args.identity_salt.clone(),
    });

    for kind in [ActionKind::Submissions, ActionKind::Votes] {
        if let Some(limit) = state.rate_limiter.limit(kind) {
            tracing::info!(
                action = %kind,
                max = limit.max,
                window_secs = limit.window.as_secs(),
                "rate limit configured"
            );
        }
    }
    tracing::info!(confidence = confidence.level(), "wilson ranking configured");

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Heard API running on http://localhost:{}", args.port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
