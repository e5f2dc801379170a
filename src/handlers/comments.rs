use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::metrics::{COMMENT_LIST_LATENCY, REQUEST_TOTAL};
use crate::models::{
    Comment, CommentsQuery, CommentsResponse, ListedComment, NewComment, SortBy,
};
use crate::state::AppState;
use crate::wilson;

const MAX_COMMENT_CHARS: usize = 2000;

pub async fn list_comments_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(experience_id): ApiPath<u64>,
    ApiQuery(query): ApiQuery<CommentsQuery>,
) -> AppResult<Json<CommentsResponse>> {
    REQUEST_TOTAL.inc();
    let _timer = COMMENT_LIST_LATENCY.start_timer();

    if !state.store.has_experience(experience_id) {
        return Err(AppError::NotFound("experience"));
    }

    // oldest first
    let comments = state.store.comments_for(experience_id);

    let listed = match query.sort_by {
        SortBy::Wilson => {
            let ranked = wilson::sort_descending(&comments, state.confidence);
            wilson::annotate(&ranked, state.confidence)
                .into_iter()
                .map(|(comment, score)| ListedComment {
                    comment: (*comment).clone(),
                    wilson_score: Some(score),
                })
                .collect()
        }
        SortBy::Oldest => unscored(comments),
        SortBy::Newest => unscored(comments.into_iter().rev().collect()),
    };

    Ok(Json(CommentsResponse { comments: listed }))
}

fn unscored(comments: Vec<Comment>) -> Vec<ListedComment> {
    comments
        .into_iter()
        .map(|comment| ListedComment {
            comment,
            wilson_score: None,
        })
        .collect()
}

pub async fn create_comment_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(experience_id): ApiPath<u64>,
    ApiJson(payload): ApiJson<NewComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    REQUEST_TOTAL.inc();

    let body = payload.body.trim();
    if body.is_empty() || body.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::BadRequest(format!(
            "body must be between 1 and {} characters",
            MAX_COMMENT_CHARS
        )));
    }

    let comment = state
        .store
        .insert_comment(experience_id, payload)
        .ok_or(AppError::NotFound("experience"))?;

    Ok((StatusCode::CREATED, Json(comment)))
}
