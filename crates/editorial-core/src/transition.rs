//! Article review transition engine
//!
//! Moves an article through the review pipeline. Each transition:
//!
//! 1. loads the article (`NotFound`)
//! 2. checks the actor has any standing for the action (`Unauthorized`)
//! 3. checks the current status is one the transition starts from
//!    (`InvalidTransition`)
//! 4. checks the full policy, status included (`Unauthorized`)
//! 5. commits the new status and one audit entry in a single store write
//! 6. publishes `article.status_changed`
//!
//! Step 5 re-checks the stored status, so a concurrent transition surfaces
//! as `InvalidTransition` and writes nothing.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use editorial_events::EventBus;
use editorial_rbac::ArticleAction;

use crate::article::{Article, ArticleStatus};
use crate::error::{EditorialError, EditorialResult};
use crate::events::{self, ArticleEvent};
use crate::policy;
use crate::review::ArticleReview;
use crate::store::{EditorialStore, StoreError};
use crate::user::User;

use ArticleStatus::*;

/// A review pipeline transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Author hands the article in
    Submit,
    /// Editor picks up a submitted article
    EditorReview,
    /// Editor passes the article on to the admins
    Approve,
    /// Editor sends the article back to the author
    RequestRevision,
    /// Admin picks up an approved article
    AdminReview,
    /// Admin puts the article live
    Publish,
    /// Admin turns the article down
    Reject,
}

impl Transition {
    /// Statuses the transition may start from.
    pub fn from_statuses(&self) -> &'static [ArticleStatus] {
        match self {
            Transition::Submit => &[Draft, Revision],
            Transition::EditorReview => &[Submitted],
            Transition::Approve | Transition::RequestRevision => {
                &[Submitted, ReviewEditor, Revision]
            }
            Transition::AdminReview => &[Approved],
            Transition::Publish | Transition::Reject => &[Approved, ReviewAdmin],
        }
    }

    /// Status the transition ends in.
    pub fn target(&self) -> ArticleStatus {
        match self {
            Transition::Submit => Submitted,
            Transition::EditorReview => ReviewEditor,
            Transition::Approve => Approved,
            Transition::RequestRevision => Revision,
            Transition::AdminReview => ReviewAdmin,
            Transition::Publish => Published,
            Transition::Reject => Rejected,
        }
    }

    /// Label recorded in the audit trail.
    pub fn label(&self) -> &'static str {
        match self {
            Transition::Submit => "submit",
            Transition::EditorReview => "review_editor",
            Transition::Approve => "approve",
            Transition::RequestRevision => "request_revision",
            Transition::AdminReview => "review_admin",
            Transition::Publish => "publish",
            Transition::Reject => "reject",
        }
    }

    /// Policy action guarding the transition.
    pub fn action(&self) -> ArticleAction {
        match self {
            Transition::Submit => ArticleAction::Submit,
            Transition::EditorReview => ArticleAction::ReviewAsEditor,
            Transition::Approve => ArticleAction::Approve,
            Transition::RequestRevision => ArticleAction::RequestRevision,
            Transition::AdminReview => ArticleAction::ReviewAsAdmin,
            Transition::Publish => ArticleAction::Publish,
            Transition::Reject => ArticleAction::Reject,
        }
    }

    /// Check if the transition may start from `status`.
    pub fn starts_from(&self, status: ArticleStatus) -> bool {
        status.is_one_of(self.from_statuses())
    }

    /// Parse from an audit label.
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().into_iter().find(|t| t.label() == label)
    }

    /// All transitions.
    pub fn all() -> Vec<Self> {
        vec![
            Transition::Submit,
            Transition::EditorReview,
            Transition::Approve,
            Transition::RequestRevision,
            Transition::AdminReview,
            Transition::Publish,
            Transition::Reject,
        ]
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of a committed transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// The article as stored after the transition
    pub article: Article,
    /// The audit entry written with it
    pub review: ArticleReview,
}

/// Applies review transitions against a store.
#[derive(Clone)]
pub struct TransitionEngine {
    store: Arc<dyn EditorialStore>,
    events: Option<Arc<dyn EventBus>>,
}

impl TransitionEngine {
    /// Create an engine without event publishing.
    pub fn new(store: Arc<dyn EditorialStore>) -> Self {
        Self {
            store,
            events: None,
        }
    }

    /// Publish `article.status_changed` on `bus` after each transition.
    pub fn with_events(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Transitions `actor` could apply to `article` right now.
    pub fn available(&self, actor: Option<&User>, article: &Article) -> Vec<Transition> {
        Transition::all()
            .into_iter()
            .filter(|t| t.starts_from(article.status) && policy::decide(actor, article, t.action()))
            .collect()
    }

    /// Apply `transition` to the article.
    ///
    /// # Arguments
    ///
    /// * `actor` - The acting user (`None`: unauthenticated)
    /// * `article_id` - Article to move
    /// * `transition` - Transition to apply
    /// * `note` - Optional reviewer note stored with the audit entry
    ///
    /// # Errors
    ///
    /// * [`EditorialError::NotFound`] - no such article
    /// * [`EditorialError::Unauthorized`] - the policy denies the action
    /// * [`EditorialError::InvalidTransition`] - the article is not in a
    ///   status the transition starts from
    #[instrument(skip_all, fields(article_id = %article_id, transition = %transition))]
    pub async fn apply(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
        transition: Transition,
        note: Option<String>,
    ) -> EditorialResult<TransitionOutcome> {
        let mut article = self
            .store
            .get_article(article_id)
            .await?
            .ok_or_else(|| EditorialError::not_found("article", article_id))?;
        let action = transition.action();

        let actor = match actor {
            Some(actor) if policy::has_standing(Some(actor), &article, action) => actor,
            _ => {
                warn!(actor_id = ?actor.map(|a| a.id), "Transition denied: no standing");
                return Err(EditorialError::unauthorized(action));
            }
        };

        let from = article.status;
        if !transition.starts_from(from) {
            debug!(status = %from, "Transition does not start from current status");
            return Err(EditorialError::InvalidTransition {
                action: transition.label().to_string(),
                from,
            });
        }

        if let Err(e) = policy::authorize(Some(actor), &article, action) {
            warn!(actor_id = %actor.id, status = %from, "Transition denied by policy");
            return Err(e);
        }

        let to = transition.target();
        article.status = to;
        if transition == Transition::Publish {
            article.published_at = Some(Utc::now());
        }
        article.touch();

        let review = ArticleReview::new(article.id, actor.id, transition.label(), from, to)
            .with_note(note);

        match self.store.commit_transition(&article, &review).await {
            Ok(()) => {}
            Err(StoreError::StatusChanged { found, .. }) => {
                debug!(status = %found, "Article status changed concurrently");
                return Err(EditorialError::InvalidTransition {
                    action: transition.label().to_string(),
                    from: found,
                });
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            actor_id = %actor.id,
            from = %from,
            to = %to,
            "Article transitioned"
        );

        let event = ArticleEvent::StatusChanged {
            article_id: article.id,
            action: review.action.clone(),
            from,
            to,
            note: review.note.clone(),
        };
        events::publish(self.events.as_ref(), event.to_event(actor.id)).await;

        Ok(TransitionOutcome { article, review })
    }

    /// Submit a draft or revised article for review.
    pub async fn submit(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
    ) -> EditorialResult<TransitionOutcome> {
        self.apply(actor, article_id, Transition::Submit, None).await
    }

    /// Start the editor review of a submitted article.
    pub async fn start_editor_review(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
        note: Option<String>,
    ) -> EditorialResult<TransitionOutcome> {
        self.apply(actor, article_id, Transition::EditorReview, note)
            .await
    }

    /// Approve the article for the admin stage.
    pub async fn approve(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
        note: Option<String>,
    ) -> EditorialResult<TransitionOutcome> {
        self.apply(actor, article_id, Transition::Approve, note).await
    }

    /// Send the article back to its author.
    pub async fn request_revision(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
        note: Option<String>,
    ) -> EditorialResult<TransitionOutcome> {
        self.apply(actor, article_id, Transition::RequestRevision, note)
            .await
    }

    /// Start the admin review of an approved article.
    pub async fn start_admin_review(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
        note: Option<String>,
    ) -> EditorialResult<TransitionOutcome> {
        self.apply(actor, article_id, Transition::AdminReview, note)
            .await
    }

    /// Publish the article; sets `published_at`.
    pub async fn publish(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
        note: Option<String>,
    ) -> EditorialResult<TransitionOutcome> {
        self.apply(actor, article_id, Transition::Publish, note).await
    }

    /// Reject the article.
    pub async fn reject(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
        note: Option<String>,
    ) -> EditorialResult<TransitionOutcome> {
        self.apply(actor, article_id, Transition::Reject, note).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::ArticleStore;
    use crate::taxonomy::Rubrik;
    use editorial_events::MemoryEventBus;
    use editorial_rbac::Role;

    struct Fixture {
        store: MemoryStore,
        engine: TransitionEngine,
        author: User,
        editor: User,
        admin: User,
        article_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let rubrik = store.add_rubrik(Rubrik::new("Politik")).await;
        let author = User::new("Author", "author@example.com").with_role(Role::Author);
        let editor = User::new("Editor", "editor@example.com")
            .with_role(Role::EditorRubrik)
            .with_rubrik(rubrik);
        let admin = User::new("Admin", "admin@example.com")
            .with_role(Role::AdminRubrik)
            .with_rubrik(rubrik);

        let mut article = Article::new(author.id, "Budget debate").with_rubrik(rubrik);
        article.slug = "budget-debate".to_string();
        store.insert_article(&article).await.unwrap();

        Fixture {
            engine: TransitionEngine::new(Arc::new(store.clone())),
            store,
            author,
            editor,
            admin,
            article_id: article.id,
        }
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(Transition::Submit.from_statuses(), &[Draft, Revision]);
        assert_eq!(Transition::Publish.target(), Published);
        assert_eq!(Transition::EditorReview.action(), ArticleAction::ReviewAsEditor);
        assert_eq!(Transition::parse("review_admin"), Some(Transition::AdminReview));
        assert_eq!(Transition::parse("unknown"), None);
        assert!(!Transition::Reject.starts_from(Submitted));
    }

    #[test]
    fn test_labels_round_trip() {
        for transition in Transition::all() {
            assert_eq!(Transition::parse(transition.label()), Some(transition));
        }
    }

    #[tokio::test]
    async fn test_full_review_path_with_reviews() {
        let f = fixture().await;
        let e = &f.engine;

        e.submit(Some(&f.author), f.article_id).await.unwrap();
        e.start_editor_review(Some(&f.editor), f.article_id, None).await.unwrap();
        e.approve(Some(&f.editor), f.article_id, Some("Solid".into())).await.unwrap();
        e.start_admin_review(Some(&f.admin), f.article_id, None).await.unwrap();
        let outcome = e.publish(Some(&f.admin), f.article_id, None).await.unwrap();

        assert_eq!(outcome.article.status, Published);
        assert!(outcome.article.published_at.is_some());

        let labels: Vec<String> = f
            .store
            .reviews_for(f.article_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.action)
            .collect();
        assert_eq!(
            labels,
            vec!["submit", "review_editor", "approve", "review_admin", "publish"]
        );
    }

    #[tokio::test]
    async fn test_revision_loop() {
        let f = fixture().await;
        let e = &f.engine;

        e.submit(Some(&f.author), f.article_id).await.unwrap();
        let outcome = e
            .request_revision(Some(&f.editor), f.article_id, Some("  Needs sources ".into()))
            .await
            .unwrap();
        assert_eq!(outcome.article.status, Revision);
        assert_eq!(outcome.review.note.as_deref(), Some("Needs sources"));

        let outcome = e.submit(Some(&f.author), f.article_id).await.unwrap();
        assert_eq!(outcome.review.from_status, Revision);
        assert_eq!(outcome.article.status, Submitted);
    }

    #[tokio::test]
    async fn test_missing_article() {
        let f = fixture().await;
        let err = f.engine.submit(Some(&f.author), Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, EditorialError::NotFound { entity: "article", .. }));
    }

    #[tokio::test]
    async fn test_anonymous_actor_is_unauthorized() {
        let f = fixture().await;
        let err = f.engine.submit(None, f.article_id).await.unwrap_err();
        assert!(matches!(err, EditorialError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_wrong_status_is_invalid_transition() {
        let f = fixture().await;
        let err = f
            .engine
            .publish(Some(&f.admin), f.article_id, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EditorialError::InvalidTransition { from: Draft, .. }
        ));
        assert!(f.store.reviews_for(f.article_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_without_rubrik_is_unauthorized() {
        let f = fixture().await;
        let mut article = Article::new(f.author.id, "Unfiled");
        article.slug = "unfiled".to_string();
        f.store.insert_article(&article).await.unwrap();

        let err = f.engine.submit(Some(&f.author), article.id).await.unwrap_err();
        assert!(matches!(err, EditorialError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_available_transitions() {
        let f = fixture().await;
        let article = f.store.get_article(f.article_id).await.unwrap().unwrap();
        assert_eq!(
            f.engine.available(Some(&f.author), &article),
            vec![Transition::Submit]
        );
        assert!(f.engine.available(Some(&f.editor), &article).is_empty());

        f.engine.submit(Some(&f.author), f.article_id).await.unwrap();
        let article = f.store.get_article(f.article_id).await.unwrap().unwrap();
        assert_eq!(
            f.engine.available(Some(&f.editor), &article),
            vec![
                Transition::EditorReview,
                Transition::Approve,
                Transition::RequestRevision
            ]
        );
    }

    #[tokio::test]
    async fn test_publishes_status_changed_event() {
        let f = fixture().await;
        let bus = Arc::new(MemoryEventBus::new());
        let mut sub = bus.subscribe("article.*").await.unwrap();
        let engine = f.engine.clone().with_events(bus);

        engine.submit(Some(&f.author), f.article_id).await.unwrap();

        let event = sub.recv().await.unwrap();
        assert_eq!(event.event_type, "article.status_changed");
        assert_eq!(event.actor_id, Some(f.author.id));
        assert_eq!(event.payload["action"], "submit");
        assert_eq!(event.payload["from"], "draft");
        assert_eq!(event.payload["to"], "submitted");
    }
}
