use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::handlers::{REMAINING_HEADER, throttle};
use crate::identity::ClientIp;
use crate::metrics::REQUEST_TOTAL;
use crate::models::VoteRequest;
use crate::rate_limit::ActionKind;
use crate::state::AppState;

pub async fn vote_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(comment_id): ApiPath<u64>,
    ip: ClientIp,
    ApiJson(payload): ApiJson<VoteRequest>,
) -> AppResult<impl IntoResponse> {
    REQUEST_TOTAL.inc();

    let remaining = throttle(&state, &ip, ActionKind::Votes)?;

    let comment = state
        .store
        .vote(comment_id, payload.direction)
        .ok_or(AppError::NotFound("comment"))?;

    Ok(([(REMAINING_HEADER, remaining.to_string())], Json(comment)))
}
