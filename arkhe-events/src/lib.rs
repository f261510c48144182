//! # Arkhe Events
//!
//! Lifecycle events emitted by the Arkhe administration when users and roles
//! change, and an event bus to deliver them to listeners (audit trails, cache
//! invalidation, notifications).
//!
//! ## Event Types
//!
//! - `user.created`, `user.updated`, `user.deleted`
//! - `role.created`, `role.updated`, `role.deleted`
//!
//! Every event records the principal who caused it, when known.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use arkhe_events::{AdminEvent, EventBus, MemoryEventBus};
//! use arkhe_rbac::RoleId;
//!
//! async fn example() {
//!     let bus = MemoryEventBus::new();
//!     let mut sub = bus.subscribe("arkhe.role.*").await.unwrap();
//!
//!     let event = AdminEvent::RoleDeleted {
//!         role_id: RoleId::new("moderator"),
//!         deleted_by: None,
//!     };
//!     bus.publish(event.to_event().unwrap()).await.unwrap();
//!
//!     while let Ok(event) = sub.recv().await {
//!         println!("Received: {}", event.event_type);
//!     }
//! }
//! ```
//!
//! ## Topic Patterns
//!
//! Topics are structured as `{source}.{event_type}`:
//! - `arkhe.user.created` - Specific event
//! - `arkhe.user.*` - All user events
//! - `arkhe.#` - All administration events
//!
//! Wildcards:
//! - `*` matches exactly one segment
//! - `#` matches zero or more segments

pub mod bus;
pub mod types;

// Re-export main types
pub use bus::{EventBus, EventBusError, EventBusResult, EventBusStats, EventHandler, MemoryEventBus, Subscription};
pub use types::{AdminEvent, Event, EventCategory, SOURCE};
