use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{Comment, Experience, NewComment, NewExperience, VoteDirection};

// In-process store for experiences and their comments.
// Everything lives for the lifetime of the process.

pub struct Store {
    experiences: DashMap<u64, Experience>,
    comments: DashMap<u64, Comment>,
    next_id: AtomicU64,
}

impl Store {
    pub fn new() -> Self {
        Self {
            experiences: DashMap::new(),
            comments: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn insert_experience(&self, new: NewExperience) -> Experience {
        let experience = Experience {
            id: self.id(),
            church_name: new.church_name,
            body: new.body,
            rating: new.rating,
            created_at: Utc::now(),
        };
        self.experiences.insert(experience.id, experience.clone());
        experience
    }

    pub fn has_experience(&self, id: u64) -> bool {
        self.experiences.contains_key(&id)
    }

    // None when the experience doesn't exist
    pub fn insert_comment(&self, experience_id: u64, new: NewComment) -> Option<Comment> {
        if !self.has_experience(experience_id) {
            return None;
        }
        let comment = Comment {
            id: self.id(),
            experience_id,
            body: new.body,
            upvote_count: 0,
            downvote_count: 0,
            created_at: Utc::now(),
        };
        self.comments.insert(comment.id, comment.clone());
        Some(comment)
    }

    // Comments for one experience, oldest first
    pub fn comments_for(&self, experience_id: u64) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.experience_id == experience_id)
            .map(|c| c.value().clone())
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        comments
    }

    pub fn vote(&self, comment_id: u64, direction: VoteDirection) -> Option<Comment> {
        let mut comment = self.comments.get_mut(&comment_id)?;
        match direction {
            VoteDirection::Up => comment.upvote_count += 1,
            VoteDirection::Down => comment.downvote_count += 1,
        }
        Some(comment.value().clone())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
