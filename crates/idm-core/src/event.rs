//! Audit events for privileged-user mutations.
//!
//! Every mutating facade operation produces one event, whether it succeeded
//! or failed. Events record who was changed and how, never credential
//! material.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use idm_model::{StoreIdentifier, UserIdentifier};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Claims appended.
    AttributesAdded,
    /// User added to groups.
    UserJoinedGroups,
    /// Roles assigned in one batch.
    RolesAssigned,
    /// Single role assigned.
    RoleAssigned,
    /// Account linked.
    AccountLinked,
    /// Account unlinked.
    AccountUnlinked,
    /// Credentials of a kind replaced.
    CredentialsReset,
    /// Credential added.
    CredentialAdded,
    /// Credential removed.
    CredentialRemoved,
    /// User entry deleted.
    UserDropped,
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// An audit record for one mutating operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,
    /// When the operation finished.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: EventType,
    /// Outcome of the operation.
    pub outcome: EventOutcome,
    /// User the operation applied to.
    pub user: UserIdentifier,
    /// Identity store the facade is bound to.
    pub store: StoreIdentifier,
    /// Error message (for failure events).
    pub error: Option<String>,
    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub fn builder(
        event_type: EventType,
        user: UserIdentifier,
        store: StoreIdentifier,
    ) -> EventBuilder {
        EventBuilder::new(event_type, user, store)
    }

    /// Looks up a detail value by key.
    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for creating events.
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    user: UserIdentifier,
    store: StoreIdentifier,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder with a success outcome.
    #[must_use]
    pub fn new(event_type: EventType, user: UserIdentifier, store: StoreIdentifier) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            user,
            store,
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to success.
    #[must_use]
    pub const fn success(mut self) -> Self {
        self.outcome = EventOutcome::Success;
        self
    }

    /// Sets the outcome to failure with an error message.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            user: self.user,
            store: self.store,
            error: self.error,
            details: self.details,
        }
    }
}

/// Receives audit events.
///
/// Listeners are called synchronously after the store call returns and must
/// not fail; they cannot change the result of the operation.
pub trait EventListener: Send + Sync {
    /// Handles one event.
    fn on_event(&self, event: &Event);
}

/// Listener that writes events to the tracing framework at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventListener;

impl TracingEventListener {
    /// Creates a new tracing listener.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EventListener for TracingEventListener {
    fn on_event(&self, event: &Event) {
        tracing::info!(
            event_id = %event.id,
            event_type = ?event.event_type,
            outcome = ?event.outcome,
            user = %event.user,
            store = %event.store,
            error = ?event.error,
            "privileged_user_event"
        );
    }
}

/// In-memory listener for testing.
#[derive(Debug, Default)]
pub struct InMemoryEventListener {
    events: RwLock<Vec<Event>>,
}

impl InMemoryEventListener {
    /// Creates a new in-memory listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shared listener, ready to hand to a facade.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Returns the recorded event types, in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<EventType> {
        self.events.read().iter().map(|e| e.event_type).collect()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventListener for InMemoryEventListener {
    fn on_event(&self, event: &Event) {
        self.events.write().push(event.clone());
    }
}
