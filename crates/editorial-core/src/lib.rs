//! # Editorial Core
//!
//! Domain core of the editorial backend: articles moving through a
//! multi-stage review pipeline, the policy deciding who may act on them, and
//! the services assigning editorial roles to users.
//!
//! ## Overview
//!
//! The editorial-core crate handles:
//! - **Articles**: the article model and its pre-save normalization
//! - **Policy**: pure `(actor, article, action)` decisions
//! - **Transitions**: the review state machine with an append-only audit trail
//! - **Assignment**: single-role assignment and bulk role changes
//! - **Storage**: async store traits plus an in-memory implementation
//!
//! ## Review Pipeline
//!
//! ```text
//! draft | revision                     ──submit──────────> submitted
//! submitted                            ──review_editor───> review_editor
//! submitted | review_editor | revision ──approve─────────> approved
//!                                      ──request_revision> revision
//! approved                             ──review_admin────> review_admin
//! approved | review_admin              ──publish─────────> published
//!                                      ──reject──────────> rejected
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use editorial_core::{
//!     ArticleService, EditorialConfig, MemoryStore, NewArticle, Rubrik, TransitionEngine, User,
//! };
//! use editorial_rbac::Role;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EditorialConfig::from_env()?;
//! let store = MemoryStore::with_guard(&config.guard);
//! let rubrik = store.add_rubrik(Rubrik::new("Politik")).await;
//! let author = User::new("Dewi", "dewi@example.com").with_role(Role::Author);
//!
//! let articles = ArticleService::new(Arc::new(store.clone()), config);
//! let engine = TransitionEngine::new(Arc::new(store));
//!
//! let article = articles
//!     .create(Some(&author), NewArticle::titled("Budget debate").in_rubrik(rubrik))
//!     .await?;
//! let outcome = engine.submit(Some(&author), article.id).await?;
//! assert_eq!(outcome.review.action, "submit");
//! # Ok(())
//! # }
//! ```

pub mod article;
pub mod articles;
pub mod assignment;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod memory;
pub mod policy;
pub mod review;
pub mod slug;
pub mod store;
pub mod taxonomy;
pub mod transition;
pub mod user;

// Re-export main types
pub use article::{Article, ArticleChanges, ArticleMeta, ArticleStatus, NewArticle};
pub use articles::ArticleService;
pub use assignment::{AssignRoleRequest, AssignmentService};
pub use config::{ConfigError, EditorialConfig, SlugPolicy};
pub use error::{EditorialError, EditorialResult, FieldErrors};
pub use events::{ArticleEvent, UserEvent};
pub use memory::MemoryStore;
pub use review::ArticleReview;
pub use store::{
    ArticleStore, EditorialStore, RoleStore, StoreError, StoreResult, TaxonomyStore, UserStore,
};
pub use taxonomy::{Division, Rubrik};
pub use transition::{Transition, TransitionEngine, TransitionOutcome};
pub use user::User;
