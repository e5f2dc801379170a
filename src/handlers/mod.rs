mod comments;
mod experiences;
mod health;
mod metrics;
mod votes;

pub use comments::{create_comment_handler, list_comments_handler};
pub use experiences::create_experience_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use votes::vote_handler;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::identity::{ClientIp, identity_hash};
use crate::metrics::{RATE_LIMIT_KEYS, RATE_LIMITED_TOTAL};
use crate::rate_limit::ActionKind;
use crate::state::AppState;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/experiences", post(create_experience_handler))
        .route(
            "/api/experiences/{id}/comments",
            get(list_comments_handler).post(create_comment_handler),
        )
        .route("/api/comments/{id}/vote", post(vote_handler))
        .with_state(state)
}

// Rate limit check, returns the remaining quota when allowed
pub(crate) fn throttle(state: &AppState, ip: &ClientIp, kind: ActionKind) -> AppResult<u32> {
    let identity = identity_hash(&state.identity_salt, &ip.0);
    let decision = state.rate_limiter.check(&identity, kind);
    RATE_LIMIT_KEYS.set(state.rate_limiter.tracked_keys() as f64);

    if decision.allowed {
        return Ok(decision.remaining);
    }

    RATE_LIMITED_TOTAL.with_label_values(&[kind.as_str()]).inc();
    let message = state
        .rate_limiter
        .limit(kind)
        .map(|limit| limit.describe(kind))
        .unwrap_or_else(|| "Rate limit exceeded. Try again later.".to_string());

    Err(AppError::RateLimited {
        kind,
        message,
        retry_after: decision.reset_after,
    })
}
