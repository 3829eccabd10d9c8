//! # Editorial Events
//!
//! Publish/subscribe plumbing for editorial domain events: article status
//! changes, article edits, role assignments.
//!
//! ## Topic Patterns
//!
//! Topics are the event type, dot separated:
//! - `article.status_changed` - Specific event
//! - `article.*` - Every article event
//! - `#` - All events
//!
//! Wildcards:
//! - `*` matches exactly one segment
//! - `#` matches zero or more segments
//!
//! ## Usage
//!
//! ```rust,no_run
//! use editorial_events::{Event, EventBus, MemoryEventBus};
//!
//! async fn example() {
//!     let bus = MemoryEventBus::new();
//!     let mut sub = bus.subscribe("article.*").await.unwrap();
//!
//!     bus.publish(Event::new("article.created", serde_json::json!({})))
//!         .await
//!         .unwrap();
//!
//!     let event = sub.recv().await.unwrap();
//!     assert_eq!(event.event_type, "article.created");
//! }
//! ```

pub mod bus;
pub mod types;

// Re-export main types
pub use bus::{EventBus, EventBusError, EventBusResult, EventBusStats, MemoryEventBus, Subscription};
pub use types::Event;
