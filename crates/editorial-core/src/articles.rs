//! Article service
//!
//! Content operations on articles: create, edit, delete, read. Status is not
//! editable here; see [`crate::TransitionEngine`].

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use editorial_events::EventBus;
use editorial_rbac::ArticleAction;

use crate::article::{Article, ArticleChanges, NewArticle};
use crate::config::{EditorialConfig, SlugPolicy};
use crate::error::{EditorialError, EditorialResult, FieldErrors};
use crate::events::{self, ArticleEvent};
use crate::lifecycle;
use crate::policy;
use crate::review::ArticleReview;
use crate::slug;
use crate::store::{EditorialStore, StoreError};
use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Insert,
    Update,
}

/// Article content service.
#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn EditorialStore>,
    events: Option<Arc<dyn EventBus>>,
    config: EditorialConfig,
}

impl ArticleService {
    /// Create a service without event publishing.
    pub fn new(store: Arc<dyn EditorialStore>, config: EditorialConfig) -> Self {
        Self {
            store,
            events: None,
            config,
        }
    }

    /// Publish article events on `bus`.
    pub fn with_events(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EditorialConfig {
        &self.config
    }

    /// Create a draft.
    ///
    /// `author_id` defaults to the actor and the slug is derived from the
    /// title unless one is given.
    ///
    /// # Errors
    ///
    /// * [`EditorialError::Unauthorized`] - no actor, or the actor may not
    ///   create articles
    /// * [`EditorialError::ValidationFailed`] - bad title, excerpt, rubrik,
    ///   division or a taken explicit slug
    #[instrument(skip_all, fields(title = %input.title))]
    pub async fn create(&self, actor: Option<&User>, input: NewArticle) -> EditorialResult<Article> {
        let actor = actor.ok_or_else(|| EditorialError::unauthorized(ArticleAction::Create))?;
        let explicit_slug = input.slug.as_deref().is_some_and(|s| !s.trim().is_empty());

        let mut article =
            lifecycle::prepare_new(input, Some(actor.id), self.config.slug_suffix_len)?;
        policy::authorize(Some(actor), &article, ArticleAction::Create)?;

        let mut errors = FieldErrors::new();
        self.check_title(&article.title, &mut errors);
        self.check_excerpt(article.excerpt.as_deref(), &mut errors);
        self.check_taxonomy(article.rubrik_id, article.division_id, &mut errors)
            .await?;
        errors.into_result()?;

        self.write(&mut article, !explicit_slug, WriteMode::Insert).await?;

        info!(article_id = %article.id, slug = %article.slug, "Article created");

        let event = ArticleEvent::Created {
            article_id: article.id,
            author_id: article.author_id,
            slug: article.slug.clone(),
        };
        events::publish(self.events.as_ref(), event.to_event(actor.id)).await;

        Ok(article)
    }

    /// Edit content fields.
    ///
    /// A new title keeps the existing slug under [`SlugPolicy::Preserve`]
    /// and derives a fresh one under [`SlugPolicy::Regenerate`]. An explicit
    /// slug in `changes` wins over both; an empty one asks for
    /// re-derivation.
    ///
    /// # Errors
    ///
    /// * [`EditorialError::InvalidTransition`] - the status moved after the
    ///   edit was authorized; nothing is written
    #[instrument(skip_all, fields(article_id = %article_id))]
    pub async fn update(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
        changes: ArticleChanges,
    ) -> EditorialResult<Article> {
        let mut article = self.load(article_id).await?;
        policy::authorize(actor, &article, ArticleAction::Update)?;
        let actor_id = article_actor(actor, ArticleAction::Update)?;

        if changes.is_empty() {
            debug!("No changes");
            return Ok(article);
        }

        let mut errors = FieldErrors::new();
        if let Some(title) = &changes.title {
            self.check_title(title, &mut errors);
        }
        if let Some(Some(excerpt)) = &changes.excerpt {
            self.check_excerpt(Some(excerpt.as_str()), &mut errors);
        }
        self.check_taxonomy(
            changes.rubrik_id.flatten(),
            changes.division_id.flatten(),
            &mut errors,
        )
        .await?;
        errors.into_result()?;

        let mut changed = Vec::new();
        let mut derived = false;

        if let Some(title) = changes.title {
            if title != article.title {
                match self.config.slug_policy {
                    SlugPolicy::Regenerate => {
                        article.set_title(title, self.config.slug_suffix_len);
                        derived = true;
                    }
                    SlugPolicy::Preserve => article.title = title,
                }
                changed.push("title");
            }
        }
        if let Some(slug) = changes.slug {
            article.slug = slug.trim().to_string();
            derived = article.slug.is_empty();
            changed.push("slug");
        }
        if let Some(rubrik_id) = changes.rubrik_id {
            article.rubrik_id = rubrik_id;
            changed.push("rubrik_id");
        }
        if let Some(division_id) = changes.division_id {
            article.division_id = division_id;
            changed.push("division_id");
        }
        if let Some(excerpt) = changes.excerpt {
            article.excerpt = excerpt;
            changed.push("excerpt");
        }
        if let Some(content) = changes.content {
            article.content = content;
            changed.push("content");
        }
        if let Some(is_anonymous) = changes.is_anonymous {
            article.is_anonymous = is_anonymous;
            changed.push("is_anonymous");
        }
        if let Some(meta) = changes.meta {
            article.meta = meta;
            changed.push("meta");
        }

        if changed.is_empty() {
            debug!("Changes match the stored article");
            return Ok(article);
        }

        if lifecycle::normalize(&mut article, self.config.slug_suffix_len) {
            derived = true;
        }
        article.touch();

        self.write(&mut article, derived, WriteMode::Update).await?;

        info!(fields = ?changed, "Article updated");

        let event = ArticleEvent::Updated {
            article_id: article.id,
            changes: changed.into_iter().map(String::from).collect(),
        };
        events::publish(self.events.as_ref(), event.to_event(actor_id)).await;

        Ok(article)
    }

    /// Delete an article with its audit trail.
    #[instrument(skip_all, fields(article_id = %article_id))]
    pub async fn delete(&self, actor: Option<&User>, article_id: Uuid) -> EditorialResult<()> {
        let article = self.load(article_id).await?;
        policy::authorize(actor, &article, ArticleAction::Delete)?;
        let actor_id = article_actor(actor, ArticleAction::Delete)?;

        if !self.store.delete_article(article_id).await? {
            return Err(EditorialError::not_found("article", article_id));
        }

        info!(status = %article.status, "Article deleted");

        let event = ArticleEvent::Deleted { article_id };
        events::publish(self.events.as_ref(), event.to_event(actor_id)).await;

        Ok(())
    }

    /// Fetch an article the actor may view.
    pub async fn get(&self, actor: Option<&User>, article_id: Uuid) -> EditorialResult<Article> {
        let article = self.load(article_id).await?;
        policy::authorize(actor, &article, ArticleAction::View)?;
        Ok(article)
    }

    /// Every article the actor may view, newest first.
    pub async fn list_visible(&self, actor: Option<&User>) -> EditorialResult<Vec<Article>> {
        let mut articles: Vec<Article> = self
            .store
            .list_articles()
            .await?
            .into_iter()
            .filter(|a| policy::decide(actor, a, ArticleAction::View))
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(articles)
    }

    /// Audit trail of an article the actor may view, oldest first.
    pub async fn history(
        &self,
        actor: Option<&User>,
        article_id: Uuid,
    ) -> EditorialResult<Vec<ArticleReview>> {
        let article = self.load(article_id).await?;
        policy::authorize(actor, &article, ArticleAction::View)?;
        Ok(self.store.reviews_for(article_id).await?)
    }

    async fn load(&self, article_id: Uuid) -> EditorialResult<Article> {
        self.store
            .get_article(article_id)
            .await?
            .ok_or_else(|| EditorialError::not_found("article", article_id))
    }

    /// Store the article. A taken slug that was derived gets a new suffix,
    /// up to `slug_attempts` tries; a taken explicit slug fails validation.
    /// An update racing a transition fails with
    /// [`EditorialError::InvalidTransition`].
    async fn write(&self, article: &mut Article, derived: bool, mode: WriteMode) -> EditorialResult<()> {
        let mut attempt = 1;
        loop {
            let result = match mode {
                WriteMode::Insert => self.store.insert_article(article).await,
                WriteMode::Update => self.store.update_article(article).await,
            };

            match result {
                Ok(()) => return Ok(()),
                Err(StoreError::Conflict { field: "slug", value }) => {
                    if !derived || attempt >= self.config.slug_attempts {
                        warn!(slug = %value, attempt, "Slug already taken");
                        return Err(EditorialError::ValidationFailed(FieldErrors::single(
                            "slug",
                            "The slug has already been taken.",
                        )));
                    }
                    debug!(slug = %value, attempt, "Slug taken, drawing a new suffix");
                    article.slug = slug::derive(&article.title, self.config.slug_suffix_len);
                    attempt += 1;
                }
                Err(StoreError::StatusChanged { found, .. }) => {
                    warn!(status = %found, "Article status changed during edit");
                    return Err(EditorialError::InvalidTransition {
                        action: ArticleAction::Update.to_string(),
                        from: found,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn check_title(&self, title: &str, errors: &mut FieldErrors) {
        if title.trim().is_empty() {
            errors.add("title", "The title field is required.");
        } else if title.chars().count() > self.config.max_title_len {
            errors.add(
                "title",
                format!(
                    "The title may not be greater than {} characters.",
                    self.config.max_title_len
                ),
            );
        }
    }

    fn check_excerpt(&self, excerpt: Option<&str>, errors: &mut FieldErrors) {
        if let Some(excerpt) = excerpt {
            if excerpt.chars().count() > self.config.max_excerpt_len {
                errors.add(
                    "excerpt",
                    format!(
                        "The excerpt may not be greater than {} characters.",
                        self.config.max_excerpt_len
                    ),
                );
            }
        }
    }

    async fn check_taxonomy(
        &self,
        rubrik_id: Option<Uuid>,
        division_id: Option<Uuid>,
        errors: &mut FieldErrors,
    ) -> EditorialResult<()> {
        if let Some(id) = rubrik_id {
            if !self.store.rubrik_exists(id).await? {
                errors.add("rubrik_id", "The selected rubrik does not exist.");
            }
        }
        if let Some(id) = division_id {
            if !self.store.division_exists(id).await? {
                errors.add("division_id", "The selected division does not exist.");
            }
        }
        Ok(())
    }
}

/// The acting user's id once the policy allowed the action.
fn article_actor(actor: Option<&User>, action: ArticleAction) -> EditorialResult<Uuid> {
    actor
        .map(|a| a.id)
        .ok_or_else(|| EditorialError::unauthorized(action))
}
