use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::handlers::{REMAINING_HEADER, throttle};
use crate::identity::ClientIp;
use crate::metrics::REQUEST_TOTAL;
use crate::models::NewExperience;
use crate::rate_limit::ActionKind;
use crate::state::AppState;

const MAX_BODY_CHARS: usize = 5000;
const MAX_NAME_CHARS: usize = 200;

fn validate(new: &NewExperience) -> AppResult<()> {
    let name = new.church_name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::BadRequest(format!(
            "churchName must be between 1 and {} characters",
            MAX_NAME_CHARS
        )));
    }
    let body = new.body.trim();
    if body.is_empty() || body.chars().count() > MAX_BODY_CHARS {
        return Err(AppError::BadRequest(format!(
            "body must be between 1 and {} characters",
            MAX_BODY_CHARS
        )));
    }
    if !(1..=5).contains(&new.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".to_string()));
    }
    Ok(())
}

pub async fn create_experience_handler(
    State(state): State<Arc<AppState>>,
    ip: ClientIp,
    ApiJson(payload): ApiJson<NewExperience>,
) -> AppResult<impl IntoResponse> {
    REQUEST_TOTAL.inc();

    validate(&payload)?;
    let remaining = throttle(&state, &ip, ActionKind::Submissions)?;

    let experience = state.store.insert_experience(payload);
    tracing::info!(experience_id = experience.id, "experience shared");

    Ok((
        StatusCode::CREATED,
        [(REMAINING_HEADER, remaining.to_string())],
        Json(experience),
    ))
}
