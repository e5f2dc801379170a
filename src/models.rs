use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wilson::Voted;

// A shared church experience
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: u64,
    pub church_name: String,
    pub body: String,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub experience_id: u64,
    pub body: String,
    pub upvote_count: u64,
    pub downvote_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Voted for Comment {
    fn positive_count(&self) -> u64 {
        self.upvote_count
    }

    fn negative_count(&self) -> u64 {
        self.downvote_count
    }
}

// Comment as it goes out on the wire, score only present for wilson sorting
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedComment {
    #[serde(flatten)]
    pub comment: Comment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wilson_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<ListedComment>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Wilson,
    Newest,
    Oldest,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommentsQuery {
    #[serde(default)]
    pub sort_by: SortBy,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExperience {
    pub church_name: String,
    pub body: String,
    pub rating: u8,
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub body: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}
