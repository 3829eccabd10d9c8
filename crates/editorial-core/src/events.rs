//! Domain events published by the editorial services.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use editorial_events::{Event, EventBus};

use crate::article::ArticleStatus;

// ============================================================================
// Article Events
// ============================================================================

/// Article events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArticleEvent {
    /// Article was created
    Created {
        article_id: Uuid,
        author_id: Uuid,
        slug: String,
    },
    /// Article content was edited
    Updated {
        article_id: Uuid,
        changes: Vec<String>,
    },
    /// Article was deleted
    Deleted { article_id: Uuid },
    /// Article moved through the review workflow
    StatusChanged {
        article_id: Uuid,
        action: String,
        from: ArticleStatus,
        to: ArticleStatus,
        note: Option<String>,
    },
}

impl ArticleEvent {
    /// Article the event is about.
    pub fn article_id(&self) -> Uuid {
        match self {
            ArticleEvent::Created { article_id, .. }
            | ArticleEvent::Updated { article_id, .. }
            | ArticleEvent::Deleted { article_id }
            | ArticleEvent::StatusChanged { article_id, .. } => *article_id,
        }
    }

    /// Convert to generic event.
    pub fn to_event(&self, actor_id: Uuid) -> Event {
        let event_type = match self {
            ArticleEvent::Created { .. } => "article.created",
            ArticleEvent::Updated { .. } => "article.updated",
            ArticleEvent::Deleted { .. } => "article.deleted",
            ArticleEvent::StatusChanged { .. } => "article.status_changed",
        };
        Event::new(event_type, serde_json::to_value(self).unwrap_or_default())
            .with_actor(actor_id)
            .with_subject(self.article_id())
    }
}

// ============================================================================
// User Events
// ============================================================================

/// User role events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    /// One user received a role
    RoleAssigned {
        user_id: Uuid,
        role: String,
        rubrik_id: Option<Uuid>,
        division_id: Option<Uuid>,
        permissions: Vec<String>,
    },
    /// Several users were moved to the same role
    RolesBulkAssigned { user_ids: Vec<Uuid>, role: String },
}

impl UserEvent {
    /// Convert to generic event.
    pub fn to_event(&self, actor_id: Uuid) -> Event {
        let (event_type, subject) = match self {
            UserEvent::RoleAssigned { user_id, .. } => ("user.role_assigned", Some(*user_id)),
            UserEvent::RolesBulkAssigned { .. } => ("user.roles_bulk_assigned", None),
        };
        let event = Event::new(event_type, serde_json::to_value(self).unwrap_or_default())
            .with_actor(actor_id);
        match subject {
            Some(id) => event.with_subject(id),
            None => event,
        }
    }
}

/// Publish on the bus, if any. Failures are logged, never returned.
pub(crate) async fn publish(bus: Option<&Arc<dyn EventBus>>, event: Event) {
    let Some(bus) = bus else {
        return;
    };
    let event_id = event.id;
    let event_type = event.event_type.clone();
    if let Err(e) = bus.publish(event).await {
        tracing::warn!(
            error = %e,
            event_id = %event_id,
            event_type = %event_type,
            "Failed to publish event"
        );
    }
}
