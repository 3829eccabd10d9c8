//! Persistence and role-store interfaces.
//!
//! The core never talks to a database directly. It needs the operations
//! below, and relies on two of them being atomic:
//!
//! - [`ArticleStore::commit_transition`]: status update + audit entry
//! - [`UserStore::set_role_for_users`]: a batch of role changes

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use editorial_rbac::{Role, RoleRegistry};

use crate::article::{Article, ArticleStatus};
use crate::review::ArticleReview;
use crate::user::User;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field is already taken.
    #[error("Duplicate {field}: {value}")]
    Conflict {
        /// Field name
        field: &'static str,
        /// Conflicting value
        value: String,
    },

    /// The record to update does not exist.
    #[error("{entity} {id} does not exist")]
    Missing {
        /// Kind of record
        entity: &'static str,
        /// Identifier
        id: Uuid,
    },

    /// The article's status changed since it was read.
    #[error("Article {article_id} is {found}, expected {expected}")]
    StatusChanged {
        /// Article
        article_id: Uuid,
        /// Status the writer read
        expected: ArticleStatus,
        /// Status currently stored
        found: ArticleStatus,
    },

    /// Backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Article and audit trail persistence.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new article. Fails with [`StoreError::Conflict`] on a taken slug.
    async fn insert_article(&self, article: &Article) -> StoreResult<()>;

    /// Replace the content of an existing article. Enforces slug uniqueness.
    ///
    /// Status only moves through [`ArticleStore::commit_transition`]:
    /// `article.status` must equal the stored status, otherwise this fails
    /// with [`StoreError::StatusChanged`] and writes nothing. The stored
    /// `published_at` is kept.
    async fn update_article(&self, article: &Article) -> StoreResult<()>;

    /// Fetch an article.
    async fn get_article(&self, id: Uuid) -> StoreResult<Option<Article>>;

    /// Every article.
    async fn list_articles(&self) -> StoreResult<Vec<Article>>;

    /// Delete an article together with its audit trail.
    ///
    /// # Returns
    ///
    /// `true` if the article existed
    async fn delete_article(&self, id: Uuid) -> StoreResult<bool>;

    /// Atomically write `article` and append `review`.
    ///
    /// Fails with [`StoreError::StatusChanged`] and writes nothing when the
    /// stored status no longer equals `review.from_status`.
    async fn commit_transition(&self, article: &Article, review: &ArticleReview) -> StoreResult<()>;

    /// Audit trail of an article, oldest first.
    async fn reviews_for(&self, article_id: Uuid) -> StoreResult<Vec<ArticleReview>>;
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a user.
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Insert or replace a user (role, rubrik, division and direct
    /// permissions in one write).
    async fn save_user(&self, user: &User) -> StoreResult<()>;

    /// Set the role of every listed user in one atomic write, leaving their
    /// other fields as stored.
    ///
    /// Fails with [`StoreError::Missing`] and writes nothing when any user
    /// does not exist.
    ///
    /// # Returns
    ///
    /// The updated users, in `user_ids` order
    async fn set_role_for_users(&self, user_ids: &[Uuid], role: Role) -> StoreResult<Vec<User>>;
}

/// Rubrik and division existence checks.
#[async_trait]
pub trait TaxonomyStore: Send + Sync {
    /// Check if a rubrik exists.
    async fn rubrik_exists(&self, id: Uuid) -> StoreResult<bool>;

    /// Check if a division exists.
    async fn division_exists(&self, id: Uuid) -> StoreResult<bool>;
}

/// The role/permission store.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Role and permission names registered under `guard`.
    ///
    /// An unknown guard yields an empty registry.
    async fn role_registry(&self, guard: &str) -> StoreResult<RoleRegistry>;
}

/// Everything the editorial services need from storage.
pub trait EditorialStore: ArticleStore + UserStore + TaxonomyStore + RoleStore {}

impl<T> EditorialStore for T where T: ArticleStore + UserStore + TaxonomyStore + RoleStore {}
