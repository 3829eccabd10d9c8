//! In-memory store.
//!
//! Implements every store trait over a single `RwLock`-guarded state, so
//! each trait method is one critical section. Used by the test suite and for
//! embedding the core without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use editorial_rbac::{RegistryError, Role, RoleRegistry};

use crate::article::Article;
use crate::review::ArticleReview;
use crate::store::{
    ArticleStore, RoleStore, StoreError, StoreResult, TaxonomyStore, UserStore,
};
use crate::taxonomy::{Division, Rubrik};
use crate::user::User;

#[derive(Debug, Default)]
struct MemoryState {
    articles: HashMap<Uuid, Article>,
    reviews: Vec<ArticleReview>,
    users: HashMap<Uuid, User>,
    rubriks: HashMap<Uuid, Rubrik>,
    divisions: HashMap<Uuid, Division>,
    registry: RoleRegistry,
}

impl MemoryState {
    fn slug_taken(&self, slug: &str, except: Uuid) -> bool {
        self.articles
            .values()
            .any(|a| a.id != except && a.slug == slug)
    }
}

/// In-memory implementation of [`crate::EditorialStore`].
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store with the default role registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store registering the default roles and permissions
    /// under `guard`.
    pub fn with_guard(guard: &str) -> Self {
        Self::with_registry(RoleRegistry::with_defaults(guard))
    }

    /// Create an empty store with a custom role registry.
    pub fn with_registry(registry: RoleRegistry) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState {
                registry,
                ..MemoryState::default()
            })),
        }
    }

    /// Add a rubrik.
    pub async fn add_rubrik(&self, rubrik: Rubrik) -> Uuid {
        let id = rubrik.id;
        self.state.write().await.rubriks.insert(id, rubrik);
        id
    }

    /// Add a division.
    pub async fn add_division(&self, division: Division) -> Uuid {
        let id = division.id;
        self.state.write().await.divisions.insert(id, division);
        id
    }

    /// Register a role name with its permission names.
    pub async fn register_role(&self, name: &str, permissions: &[&str]) -> Result<(), RegistryError> {
        self.state.write().await.registry.register_role(name, permissions)
    }

    /// Remove a role registration.
    pub async fn unregister_role(&self, name: &str) -> bool {
        self.state.write().await.registry.unregister_role(name)
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn insert_article(&self, article: &Article) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.articles.contains_key(&article.id) {
            return Err(StoreError::Conflict {
                field: "id",
                value: article.id.to_string(),
            });
        }
        if state.slug_taken(&article.slug, article.id) {
            return Err(StoreError::Conflict {
                field: "slug",
                value: article.slug.clone(),
            });
        }
        state.articles.insert(article.id, article.clone());
        Ok(())
    }

    async fn update_article(&self, article: &Article) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let (status, published_at) = match state.articles.get(&article.id) {
            Some(current) => (current.status, current.published_at),
            None => {
                return Err(StoreError::Missing {
                    entity: "article",
                    id: article.id,
                })
            }
        };
        if status != article.status {
            return Err(StoreError::StatusChanged {
                article_id: article.id,
                expected: article.status,
                found: status,
            });
        }
        if state.slug_taken(&article.slug, article.id) {
            return Err(StoreError::Conflict {
                field: "slug",
                value: article.slug.clone(),
            });
        }

        let mut stored = article.clone();
        stored.published_at = published_at;
        state.articles.insert(article.id, stored);
        Ok(())
    }

    async fn get_article(&self, id: Uuid) -> StoreResult<Option<Article>> {
        Ok(self.state.read().await.articles.get(&id).cloned())
    }

    async fn list_articles(&self) -> StoreResult<Vec<Article>> {
        Ok(self.state.read().await.articles.values().cloned().collect())
    }

    async fn delete_article(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let existed = state.articles.remove(&id).is_some();
        state.reviews.retain(|r| r.article_id != id);
        Ok(existed)
    }

    async fn commit_transition(&self, article: &Article, review: &ArticleReview) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let current = state
            .articles
            .get(&article.id)
            .ok_or(StoreError::Missing {
                entity: "article",
                id: article.id,
            })?;
        if current.status != review.from_status {
            return Err(StoreError::StatusChanged {
                article_id: article.id,
                expected: review.from_status,
                found: current.status,
            });
        }

        state.articles.insert(article.id, article.clone());
        state.reviews.push(review.clone());
        Ok(())
    }

    async fn reviews_for(&self, article_id: Uuid) -> StoreResult<Vec<ArticleReview>> {
        let state = self.state.read().await;
        let mut reviews: Vec<ArticleReview> = state
            .reviews
            .iter()
            .filter(|r| r.article_id == article_id)
            .cloned()
            .collect();
        // Append order already is creation order; the sort keeps that
        // guarantee for entries written with equal timestamps.
        reviews.sort_by_key(|r| r.created_at);
        Ok(reviews)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.state.write().await.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn set_role_for_users(&self, user_ids: &[Uuid], role: Role) -> StoreResult<Vec<User>> {
        let mut state = self.state.write().await;
        if let Some(id) = user_ids.iter().find(|id| !state.users.contains_key(*id)) {
            return Err(StoreError::Missing {
                entity: "user",
                id: *id,
            });
        }

        let mut updated = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if let Some(user) = state.users.get_mut(id) {
                user.assign_role(role);
                updated.push(user.clone());
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl TaxonomyStore for MemoryStore {
    async fn rubrik_exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.read().await.rubriks.contains_key(&id))
    }

    async fn division_exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.read().await.divisions.contains_key(&id))
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn role_registry(&self, guard: &str) -> StoreResult<RoleRegistry> {
        let state = self.state.read().await;
        if state.registry.guard() == guard {
            Ok(state.registry.clone())
        } else {
            Ok(RoleRegistry::new(guard))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleStatus;

    fn article(slug: &str) -> Article {
        let mut article = Article::new(Uuid::now_v7(), "Stored");
        article.slug = slug.to_string();
        article
    }

    #[tokio::test]
    async fn test_slug_uniqueness() {
        let store = MemoryStore::new();
        store.insert_article(&article("taken")).await.unwrap();

        let err = store.insert_article(&article("taken")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "slug", .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_own_slug_and_rejects_others() {
        let store = MemoryStore::new();
        let mut first = article("first");
        let second = article("second");
        store.insert_article(&first).await.unwrap();
        store.insert_article(&second).await.unwrap();

        first.title = "Renamed".to_string();
        store.update_article(&first).await.unwrap();

        first.slug = "second".to_string();
        assert!(store.update_article(&first).await.is_err());
        assert_eq!(
            store.get_article(first.id).await.unwrap().unwrap().slug,
            "first"
        );
    }

    #[tokio::test]
    async fn test_update_missing_article() {
        let store = MemoryStore::new();
        let err = store.update_article(&article("ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing { entity: "article", .. }));
    }

    #[tokio::test]
    async fn test_commit_transition_checks_status() {
        let store = MemoryStore::new();
        let stored = article("in-review");
        store.insert_article(&stored).await.unwrap();

        let mut moved = stored.clone();
        moved.status = ArticleStatus::Submitted;
        let stale = ArticleReview::new(
            stored.id,
            stored.author_id,
            "approve",
            ArticleStatus::Submitted,
            ArticleStatus::Approved,
        );
        let err = store.commit_transition(&moved, &stale).await.unwrap_err();
        assert!(matches!(err, StoreError::StatusChanged { found: ArticleStatus::Draft, .. }));
        assert!(store.reviews_for(stored.id).await.unwrap().is_empty());

        let review = ArticleReview::new(
            stored.id,
            stored.author_id,
            "submit",
            ArticleStatus::Draft,
            ArticleStatus::Submitted,
        );
        store.commit_transition(&moved, &review).await.unwrap();
        assert_eq!(
            store.get_article(stored.id).await.unwrap().unwrap().status,
            ArticleStatus::Submitted
        );
        assert_eq!(store.reviews_for(stored.id).await.unwrap(), vec![review]);
    }

    #[tokio::test]
    async fn test_delete_removes_audit_trail() {
        let store = MemoryStore::new();
        let stored = article("doomed");
        store.insert_article(&stored).await.unwrap();
        let mut moved = stored.clone();
        moved.status = ArticleStatus::Submitted;
        let review = ArticleReview::new(
            stored.id,
            stored.author_id,
            "submit",
            ArticleStatus::Draft,
            ArticleStatus::Submitted,
        );
        store.commit_transition(&moved, &review).await.unwrap();

        assert!(store.delete_article(stored.id).await.unwrap());
        assert!(!store.delete_article(stored.id).await.unwrap());
        assert!(store.reviews_for(stored.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_taxonomy_and_roles() {
        let store = MemoryStore::new();
        let rubrik = store.add_rubrik(Rubrik::new("Politik")).await;
        let division = store.add_division(Division::new("Nasional")).await;

        assert!(store.rubrik_exists(rubrik).await.unwrap());
        assert!(!store.rubrik_exists(division).await.unwrap());
        assert!(store.division_exists(division).await.unwrap());

        let registry = store.role_registry("web").await.unwrap();
        assert!(registry.role_exists("Author"));
        assert!(registry.permission_exists("manage.users"));

        assert!(store.unregister_role("Author").await);
        assert!(!store.role_registry("web").await.unwrap().role_exists("Author"));
    }

    #[tokio::test]
    async fn test_registry_is_scoped_to_guard() {
        let store = MemoryStore::with_guard("api");

        let api = store.role_registry("api").await.unwrap();
        assert_eq!(api.guard(), "api");
        assert_eq!(api.resolve_role("Author"), Some(Role::Author));

        let web = store.role_registry("web").await.unwrap();
        assert!(!web.role_exists("Author"));
        assert!(!web.permission_exists("article.view"));
    }

    #[tokio::test]
    async fn test_update_cannot_move_status() {
        let store = MemoryStore::new();
        let stored = article("content-only");
        store.insert_article(&stored).await.unwrap();

        let mut edited = stored.clone();
        edited.content = Some("body".to_string());
        edited.status = ArticleStatus::Published;
        edited.published_at = Some(chrono::Utc::now());
        let err = store.update_article(&edited).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::StatusChanged {
                expected: ArticleStatus::Published,
                found: ArticleStatus::Draft,
                ..
            }
        ));

        edited.status = ArticleStatus::Draft;
        store.update_article(&edited).await.unwrap();
        let saved = store.get_article(stored.id).await.unwrap().unwrap();
        assert_eq!(saved.content.as_deref(), Some("body"));
        assert_eq!(saved.status, ArticleStatus::Draft);
        assert_eq!(saved.published_at, None);
    }

    #[tokio::test]
    async fn test_set_role_for_users_keeps_other_fields() {
        let store = MemoryStore::new();
        let rubrik = Uuid::now_v7();
        let a = User::new("A", "a@example.com")
            .with_role(Role::EditorRubrik)
            .with_rubrik(rubrik);
        let b = User::new("B", "b@example.com");
        store.save_user(&a).await.unwrap();
        store.save_user(&b).await.unwrap();

        let updated = store
            .set_role_for_users(&[b.id, a.id], Role::Author)
            .await
            .unwrap();
        assert_eq!(updated.iter().map(|u| u.id).collect::<Vec<_>>(), vec![b.id, a.id]);

        let a = store.get_user(a.id).await.unwrap().unwrap();
        assert_eq!(a.role, Some(Role::Author));
        assert_eq!(a.rubrik_id, Some(rubrik));
        assert_eq!(store.get_user(b.id).await.unwrap().unwrap().role, Some(Role::Author));
    }

    #[tokio::test]
    async fn test_set_role_for_users_is_all_or_nothing() {
        let store = MemoryStore::new();
        let user = User::new("A", "a@example.com").with_role(Role::EditorRubrik);
        store.save_user(&user).await.unwrap();
        let ghost = Uuid::now_v7();

        let err = store
            .set_role_for_users(&[user.id, ghost], Role::Author)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing { entity: "user", id } if id == ghost));
        assert_eq!(
            store.get_user(user.id).await.unwrap().unwrap().role,
            Some(Role::EditorRubrik)
        );
    }
}
