//! Event types for administration lifecycle notifications
//!
//! This module defines the event envelope and the typed events emitted when
//! users and roles are created, updated or deleted.

use arkhe_rbac::{PrincipalId, RoleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::bus::{EventBusError, EventBusResult};

/// Source name stamped on every event emitted by this package.
pub const SOURCE: &str = "arkhe";

/// Event envelope.
///
/// All events are wrapped in this envelope which provides metadata
/// for routing, tracing, and processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Event type (e.g., "user.created", "role.deleted")
    pub event_type: String,

    /// Emitting package
    pub source: String,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Principal who triggered the event
    pub actor_id: Option<PrincipalId>,

    /// Correlation ID for tracing
    pub correlation_id: Option<String>,

    /// Event version for schema evolution
    pub version: u32,

    /// Event payload
    pub payload: serde_json::Value,

    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Event {
    /// Create a new event from this package.
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            source: SOURCE.to_string(),
            timestamp: Utc::now(),
            actor_id: None,
            correlation_id: None,
            version: 1,
            payload,
            metadata: HashMap::new(),
        }
    }

    /// Set the acting principal.
    pub fn with_actor(mut self, actor_id: PrincipalId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Set correlation ID.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Add metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get the topic for this event.
    ///
    /// Topics are structured as: `{source}.{event_type}`
    pub fn topic(&self) -> String {
        format!("{}.{}", self.source, self.event_type)
    }

    /// Get the category of this event, if recognised.
    pub fn category(&self) -> Option<EventCategory> {
        EventCategory::from_event_type(&self.event_type)
    }

    /// Parse the payload into a specific type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Parse the payload back into an [`AdminEvent`].
    pub fn admin_event(&self) -> Option<AdminEvent> {
        self.parse_payload().ok()
    }
}

/// Event categories for filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// User account events
    User,
    /// Role definition events
    Role,
}

impl EventCategory {
    /// Parse from event type string.
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type.split('.').next()? {
            "user" => Some(EventCategory::User),
            "role" => Some(EventCategory::Role),
            _ => None,
        }
    }
}

/// Administration lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdminEvent {
    /// A user account was created
    UserCreated {
        user_id: PrincipalId,
        email: String,
        role: Option<RoleId>,
        created_by: Option<PrincipalId>,
    },
    /// A user account was updated
    UserUpdated {
        user_id: PrincipalId,
        role: Option<RoleId>,
        updated_by: Option<PrincipalId>,
    },
    /// A user account was deleted
    UserDeleted {
        user_id: PrincipalId,
        deleted_by: Option<PrincipalId>,
    },
    /// A role was defined
    RoleCreated {
        role_id: RoleId,
        label: String,
        permissions: Vec<String>,
        created_by: Option<PrincipalId>,
    },
    /// A role definition changed
    RoleUpdated {
        role_id: RoleId,
        label: String,
        permissions: Vec<String>,
        updated_by: Option<PrincipalId>,
    },
    /// A role was deleted
    RoleDeleted {
        role_id: RoleId,
        deleted_by: Option<PrincipalId>,
    },
}

impl AdminEvent {
    /// Event type string, e.g. `user.created`.
    pub fn event_type(&self) -> &'static str {
        match self {
            AdminEvent::UserCreated { .. } => "user.created",
            AdminEvent::UserUpdated { .. } => "user.updated",
            AdminEvent::UserDeleted { .. } => "user.deleted",
            AdminEvent::RoleCreated { .. } => "role.created",
            AdminEvent::RoleUpdated { .. } => "role.updated",
            AdminEvent::RoleDeleted { .. } => "role.deleted",
        }
    }

    /// The principal who caused the event, if known.
    pub fn actor(&self) -> Option<PrincipalId> {
        match self {
            AdminEvent::UserCreated { created_by, .. } | AdminEvent::RoleCreated { created_by, .. } => {
                *created_by
            }
            AdminEvent::UserUpdated { updated_by, .. } | AdminEvent::RoleUpdated { updated_by, .. } => {
                *updated_by
            }
            AdminEvent::UserDeleted { deleted_by, .. } | AdminEvent::RoleDeleted { deleted_by, .. } => {
                *deleted_by
            }
        }
    }

    /// Convert to generic event.
    pub fn to_event(&self) -> EventBusResult<Event> {
        let payload = serde_json::to_value(self)
            .map_err(|e| EventBusError::SerializationError(e.to_string()))?;

        let event = Event::new(self.event_type(), payload);
        Ok(match self.actor() {
            Some(actor) => event.with_actor(actor),
            None => event,
        })
    }
}
