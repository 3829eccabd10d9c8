//! Services against a store where another writer gets in between a
//! service's read and its write.
//!
//! `InterleavingStore` wraps a `MemoryStore` and, when armed, performs one
//! competing write right before delegating the next matching call.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use editorial_core::{
    Article, ArticleChanges, ArticleReview, ArticleService, ArticleStatus, ArticleStore,
    AssignmentService, EditorialConfig, EditorialError, MemoryStore, NewArticle, RoleStore,
    Rubrik, StoreError, StoreResult, TaxonomyStore, TransitionEngine, User, UserStore,
};
use editorial_events::{EventBus, MemoryEventBus};
use editorial_rbac::{Permission, Role, RoleRegistry};

/// The competing write.
enum Interleave {
    /// Submit the article just before a content write lands.
    SubmitBeforeUpdate { author_id: Uuid },
    /// Rebind the users just before a batch role write lands.
    RebindBeforeRoleBatch { rubrik_id: Uuid, permission: Permission },
    /// The backend drops the next transition commit.
    FailCommit,
}

struct InterleavingStore {
    inner: MemoryStore,
    pending: Mutex<Option<Interleave>>,
}

impl InterleavingStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            pending: Mutex::new(None),
        }
    }

    async fn arm(&self, interleave: Interleave) {
        *self.pending.lock().await = Some(interleave);
    }

    async fn take(&self, wanted: fn(&Interleave) -> bool) -> Option<Interleave> {
        let mut pending = self.pending.lock().await;
        match pending.take() {
            Some(i) if wanted(&i) => Some(i),
            other => {
                *pending = other;
                None
            }
        }
    }
}

#[async_trait]
impl ArticleStore for InterleavingStore {
    async fn insert_article(&self, article: &Article) -> StoreResult<()> {
        self.inner.insert_article(article).await
    }

    async fn update_article(&self, article: &Article) -> StoreResult<()> {
        let armed = self
            .take(|i| matches!(i, Interleave::SubmitBeforeUpdate { .. }))
            .await;
        if let Some(Interleave::SubmitBeforeUpdate { author_id }) = armed {
            if let Some(mut moved) = self.inner.get_article(article.id).await? {
                let review = ArticleReview::new(
                    moved.id,
                    author_id,
                    "submit",
                    moved.status,
                    ArticleStatus::Submitted,
                );
                moved.status = ArticleStatus::Submitted;
                self.inner.commit_transition(&moved, &review).await?;
            }
        }
        self.inner.update_article(article).await
    }

    async fn get_article(&self, id: Uuid) -> StoreResult<Option<Article>> {
        self.inner.get_article(id).await
    }

    async fn list_articles(&self) -> StoreResult<Vec<Article>> {
        self.inner.list_articles().await
    }

    async fn delete_article(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_article(id).await
    }

    async fn commit_transition(&self, article: &Article, review: &ArticleReview) -> StoreResult<()> {
        if self.take(|i| matches!(i, Interleave::FailCommit)).await.is_some() {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        self.inner.commit_transition(article, review).await
    }

    async fn reviews_for(&self, article_id: Uuid) -> StoreResult<Vec<ArticleReview>> {
        self.inner.reviews_for(article_id).await
    }
}

#[async_trait]
impl UserStore for InterleavingStore {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.inner.save_user(user).await
    }

    async fn set_role_for_users(&self, user_ids: &[Uuid], role: Role) -> StoreResult<Vec<User>> {
        let armed = self
            .take(|i| matches!(i, Interleave::RebindBeforeRoleBatch { .. }))
            .await;
        if let Some(Interleave::RebindBeforeRoleBatch { rubrik_id, permission }) = armed {
            for id in user_ids {
                if let Some(mut user) = self.inner.get_user(*id).await? {
                    user.rubrik_id = Some(rubrik_id);
                    user.sync_permissions([permission]);
                    self.inner.save_user(&user).await?;
                }
            }
        }
        self.inner.set_role_for_users(user_ids, role).await
    }
}

#[async_trait]
impl TaxonomyStore for InterleavingStore {
    async fn rubrik_exists(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.rubrik_exists(id).await
    }

    async fn division_exists(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.division_exists(id).await
    }
}

#[async_trait]
impl RoleStore for InterleavingStore {
    async fn role_registry(&self, guard: &str) -> StoreResult<RoleRegistry> {
        self.inner.role_registry(guard).await
    }
}

struct TestFixture {
    memory: MemoryStore,
    store: Arc<InterleavingStore>,
    rubrik: Uuid,
    author: User,
    super_admin: User,
}

impl TestFixture {
    async fn new() -> Self {
        let memory = MemoryStore::new();
        let rubrik = memory.add_rubrik(Rubrik::new("Politik")).await;
        Self {
            store: Arc::new(InterleavingStore::new(memory.clone())),
            memory,
            rubrik,
            author: User::new("Author", "author@example.com").with_role(Role::Author),
            super_admin: User::new("Root", "root@example.com").with_role(Role::SuperAdmin),
        }
    }

    async fn draft(&self, articles: &ArticleService) -> Article {
        articles
            .create(Some(&self.author), NewArticle::titled("Contested").in_rubrik(self.rubrik))
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_edit_loses_to_a_concurrent_submit() {
    let f = TestFixture::new().await;
    let articles = ArticleService::new(f.store.clone(), EditorialConfig::default());
    let article = f.draft(&articles).await;

    f.store
        .arm(Interleave::SubmitBeforeUpdate {
            author_id: f.author.id,
        })
        .await;
    let err = articles
        .update(
            Some(&f.author),
            article.id,
            ArticleChanges {
                content: Some(Some("x".to_string())),
                ..ArticleChanges::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EditorialError::InvalidTransition {
            from: ArticleStatus::Submitted,
            ..
        }
    ));
    assert_eq!(err.status_code(), 409);

    let stored = f.memory.get_article(article.id).await.unwrap().unwrap();
    let trail = f.memory.reviews_for(article.id).await.unwrap();
    assert_eq!(stored.status, ArticleStatus::Submitted);
    assert_eq!(stored.content, None);
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].to_status, stored.status);

    // The author has lost edit rights now that the article is in review.
    let err = articles
        .update(
            Some(&f.author),
            article.id,
            ArticleChanges {
                content: Some(Some("x".to_string())),
                ..ArticleChanges::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EditorialError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_bulk_role_change_keeps_concurrent_binding() {
    let f = TestFixture::new().await;
    let user = User::new("Dewi", "dewi@example.com").with_role(Role::EditorRubrik);
    f.memory.save_user(&user).await.unwrap();
    let assignment = AssignmentService::new(f.store.clone());

    f.store
        .arm(Interleave::RebindBeforeRoleBatch {
            rubrik_id: f.rubrik,
            permission: Permission::ManageRubriks,
        })
        .await;
    let updated = assignment
        .bulk_assign_role(Some(&f.super_admin), &[user.id], "Admin Rubrik")
        .await
        .unwrap();

    let stored = f.memory.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(updated, vec![stored.clone()]);
    assert_eq!(stored.role, Some(Role::AdminRubrik));
    assert_eq!(stored.rubrik_id, Some(f.rubrik));
    assert!(stored.direct_permissions.has(Permission::ManageRubriks));
}

#[tokio::test]
async fn test_backend_failure_during_transition() {
    let f = TestFixture::new().await;
    let bus = Arc::new(MemoryEventBus::new());
    let mut sub = bus.subscribe("article.status_changed").await.unwrap();
    let articles = ArticleService::new(f.store.clone(), EditorialConfig::default());
    let engine = TransitionEngine::new(f.store.clone()).with_events(bus);
    let article = f.draft(&articles).await;

    f.store.arm(Interleave::FailCommit).await;
    let err = engine.submit(Some(&f.author), article.id).await.unwrap_err();
    assert!(matches!(err, EditorialError::Store(StoreError::Backend(_))));
    assert!(err.is_server_error());

    let stored = f.memory.get_article(article.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ArticleStatus::Draft);
    assert!(f.memory.reviews_for(article.id).await.unwrap().is_empty());
    assert!(sub.try_recv().is_none());

    engine.submit(Some(&f.author), article.id).await.unwrap();
    assert_eq!(sub.recv().await.unwrap().subject_id, Some(article.id));
}
