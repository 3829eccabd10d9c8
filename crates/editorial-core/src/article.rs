//! Article domain models
//!
//! An article is written by an author, optionally filed under a rubrik and
//! a division, and moved through the review pipeline by its `status`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::slug;

/// Review status of an article.
///
/// ```text
/// draft, revision                      --submit-->            submitted
/// submitted                            --review_editor-->     review_editor
/// submitted, review_editor, revision   --approve-->           approved
/// submitted, review_editor, revision   --request_revision-->  revision
/// approved                             --review_admin-->      review_admin
/// approved, review_admin               --publish-->           published
/// approved, review_admin               --reject-->            rejected
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    /// Being written by the author
    #[default]
    Draft,
    /// Waiting for an editor
    Submitted,
    /// Under editor review
    ReviewEditor,
    /// Sent back to the author
    Revision,
    /// Revised by the author
    Revised,
    /// Passed editor review
    Approved,
    /// Under admin review
    ReviewAdmin,
    /// Turned down at the admin stage
    Rejected,
    /// Live
    Published,
}

impl ArticleStatus {
    /// Get the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::ReviewEditor => "review_editor",
            Self::Revision => "revision",
            Self::Revised => "revised",
            Self::Approved => "approved",
            Self::ReviewAdmin => "review_admin",
            Self::Rejected => "rejected",
            Self::Published => "published",
        }
    }

    /// Parse status from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|status| status.as_str() == s)
    }

    /// Get all statuses.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Draft,
            Self::Submitted,
            Self::ReviewEditor,
            Self::Revision,
            Self::Revised,
            Self::Approved,
            Self::ReviewAdmin,
            Self::Rejected,
            Self::Published,
        ]
    }

    /// Check if the status is one of `statuses`.
    pub fn is_one_of(&self, statuses: &[ArticleStatus]) -> bool {
        statuses.contains(self)
    }

    /// Check if no further transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published | Self::Rejected)
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open article metadata.
///
/// `keywords`, `cover_url` and `cover_path` are recognized; any other key is
/// kept as-is in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleMeta {
    /// Search keywords
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Public URL of the cover image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    /// Storage path of the cover image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_path: Option<String>,

    /// Unrecognized keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ArticleMeta {
    /// Check if no key is set.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.cover_url.is_none()
            && self.cover_path.is_none()
            && self.extra.is_empty()
    }
}

/// An article.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use editorial_core::{Article, ArticleStatus};
///
/// let author_id = Uuid::now_v7();
/// let article = Article::new(author_id, "Budget debate");
/// assert_eq!(article.status, ArticleStatus::Draft);
/// assert!(article.slug.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: Uuid,

    /// Owner of the article
    pub author_id: Uuid,

    /// Topical section
    pub rubrik_id: Option<Uuid>,

    /// Organizational grouping
    pub division_id: Option<Uuid>,

    /// Headline
    pub title: String,

    /// URL slug (unique; derived from the title)
    pub slug: String,

    /// Review status
    pub status: ArticleStatus,

    /// Short teaser
    pub excerpt: Option<String>,

    /// Body
    pub content: Option<String>,

    /// Set when the article is published
    pub published_at: Option<DateTime<Utc>>,

    /// Hide the author byline
    pub is_anonymous: bool,

    /// Open metadata
    #[serde(default)]
    pub meta: ArticleMeta,

    /// When the article was created
    pub created_at: DateTime<Utc>,

    /// When the article was last updated
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Creates a new draft with an empty slug.
    ///
    /// The slug is filled in by [`crate::lifecycle::prepare_new`] before the
    /// article is stored.
    pub fn new(author_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            author_id,
            rubrik_id: None,
            division_id: None,
            title: title.into(),
            slug: String::new(),
            status: ArticleStatus::Draft,
            excerpt: None,
            content: None,
            published_at: None,
            is_anonymous: false,
            meta: ArticleMeta::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// File the article under a rubrik.
    pub fn with_rubrik(mut self, rubrik_id: Uuid) -> Self {
        self.rubrik_id = Some(rubrik_id);
        self
    }

    /// Set the division.
    pub fn with_division(mut self, division_id: Uuid) -> Self {
        self.division_id = Some(division_id);
        self
    }

    /// Set the body.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the title and derive a fresh slug from it.
    ///
    /// Unlike the update hook, this regenerates the slug even when one
    /// already exists.
    pub fn set_title(&mut self, title: impl Into<String>, suffix_len: usize) {
        self.title = title.into();
        self.slug = slug::derive(&self.title, suffix_len);
    }

    /// Check if `user_id` wrote this article.
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Check if the article is live.
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }

    /// Mark the article as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Input for creating an article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewArticle {
    /// Headline (required)
    pub title: String,

    /// Explicit owner; defaults to the creating actor
    #[serde(default)]
    pub author_id: Option<Uuid>,

    /// Explicit slug; derived from the title when absent
    #[serde(default)]
    pub slug: Option<String>,

    /// Topical section
    #[serde(default)]
    pub rubrik_id: Option<Uuid>,

    /// Organizational grouping
    #[serde(default)]
    pub division_id: Option<Uuid>,

    /// Short teaser
    #[serde(default)]
    pub excerpt: Option<String>,

    /// Body
    #[serde(default)]
    pub content: Option<String>,

    /// Hide the author byline
    #[serde(default)]
    pub is_anonymous: bool,

    /// Open metadata
    #[serde(default)]
    pub meta: ArticleMeta,
}

impl NewArticle {
    /// Start an input with just a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// File under a rubrik.
    pub fn in_rubrik(mut self, rubrik_id: Uuid) -> Self {
        self.rubrik_id = Some(rubrik_id);
        self
    }
}

/// Partial update of an article's content fields.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears a nullable
/// field. Status and `published_at` are not editable here: they belong to
/// the transition engine.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    /// New headline
    pub title: Option<String>,
    /// New slug (an empty string asks for re-derivation)
    pub slug: Option<String>,
    /// New rubrik
    pub rubrik_id: Option<Option<Uuid>>,
    /// New division
    pub division_id: Option<Option<Uuid>>,
    /// New teaser
    pub excerpt: Option<Option<String>>,
    /// New body
    pub content: Option<Option<String>>,
    /// New byline visibility
    pub is_anonymous: Option<bool>,
    /// Replacement metadata
    pub meta: Option<ArticleMeta>,
}

impl ArticleChanges {
    /// Check if the changes touch nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.rubrik_id.is_none()
            && self.division_id.is_none()
            && self.excerpt.is_none()
            && self.content.is_none()
            && self.is_anonymous.is_none()
            && self.meta.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names_round_trip() {
        for status in ArticleStatus::all() {
            assert_eq!(ArticleStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ArticleStatus::all().len(), 9);
        assert_eq!(ArticleStatus::parse("archived"), None);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&ArticleStatus::ReviewEditor).unwrap();
        assert_eq!(json, "\"review_editor\"");
        let parsed: ArticleStatus = serde_json::from_str("\"review_admin\"").unwrap();
        assert_eq!(parsed, ArticleStatus::ReviewAdmin);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ArticleStatus::Published.is_terminal());
        assert!(ArticleStatus::Rejected.is_terminal());
        assert!(!ArticleStatus::Revision.is_terminal());
    }

    #[test]
    fn test_new_article_defaults() {
        let author = Uuid::now_v7();
        let article = Article::new(author, "Hello");
        assert_eq!(article.status, ArticleStatus::Draft);
        assert!(article.is_authored_by(author));
        assert!(article.rubrik_id.is_none());
        assert!(article.published_at.is_none());
        assert!(!article.is_anonymous);
        assert!(article.meta.is_empty());
    }

    #[test]
    fn test_set_title_regenerates_existing_slug() {
        let mut article = Article::new(Uuid::now_v7(), "Old headline");
        article.slug = "old-headline-abc123".to_string();

        article.set_title("New headline", 6);
        assert_eq!(article.title, "New headline");
        assert!(article.slug.starts_with("new-headline-"));
        assert_eq!(article.slug.len(), "new-headline-".len() + 6);
    }

    #[test]
    fn test_meta_keeps_unknown_keys() {
        let meta: ArticleMeta = serde_json::from_value(serde_json::json!({
            "keywords": ["budget", "parliament"],
            "cover_url": "https://cdn.example/cover.jpg",
            "source": "wire"
        }))
        .unwrap();

        assert_eq!(meta.keywords, vec!["budget", "parliament"]);
        assert_eq!(meta.cover_url.as_deref(), Some("https://cdn.example/cover.jpg"));
        assert!(meta.cover_path.is_none());
        assert_eq!(meta.extra["source"], "wire");

        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["source"], "wire");
        assert!(back.get("cover_path").is_none());
    }

    #[test]
    fn test_changes_is_empty() {
        assert!(ArticleChanges::default().is_empty());
        let changes = ArticleChanges {
            excerpt: Some(None),
            ..ArticleChanges::default()
        };
        assert!(!changes.is_empty());
    }
}
