//! Audit trail of review transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::article::ArticleStatus;

/// One recorded status transition of an article.
///
/// Append-only: created by the transition engine in the same store write
/// that changes the article's status, never edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleReview {
    /// Unique identifier
    pub id: Uuid,

    /// Article the transition happened to
    pub article_id: Uuid,

    /// User who performed the transition
    pub actor_id: Uuid,

    /// Transition label ("submit", "approve", ...)
    pub action: String,

    /// Status before the transition
    pub from_status: ArticleStatus,

    /// Status after the transition
    pub to_status: ArticleStatus,

    /// Reviewer note
    pub note: Option<String>,

    /// When the transition happened
    pub created_at: DateTime<Utc>,
}

impl ArticleReview {
    /// Record a transition.
    pub fn new(
        article_id: Uuid,
        actor_id: Uuid,
        action: impl Into<String>,
        from_status: ArticleStatus,
        to_status: ArticleStatus,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            article_id,
            actor_id,
            action: action.into(),
            from_status,
            to_status,
            note: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a reviewer note. Blank notes are dropped.
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }
}
