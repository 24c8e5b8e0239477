//! Order change events for the per-category audit trail.

use crate::product::Position;
use crate::store::{BatchKind, OrderBatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of event recorded for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Product was added to the category.
    ProductAdded,
    /// Unset positions were appended after the highest existing one.
    Organized,
    /// Whole category was resequenced to 1..N.
    Deduplicated,
    /// A single product was moved and the category resequenced.
    Repositioned,
    /// A product's position was cleared.
    Cleared,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProductAdded => write!(f, "PRODUCT_ADDED"),
            Self::Organized => write!(f, "ORGANIZED"),
            Self::Deduplicated => write!(f, "DEDUPLICATED"),
            Self::Repositioned => write!(f, "REPOSITIONED"),
            Self::Cleared => write!(f, "CLEARED"),
        }
    }
}

impl From<BatchKind> for EventType {
    fn from(kind: BatchKind) -> Self {
        match kind {
            BatchKind::Organize => Self::Organized,
            BatchKind::Dedupe => Self::Deduplicated,
            BatchKind::Reposition => Self::Repositioned,
            BatchKind::Clear => Self::Cleared,
        }
    }
}

/// One product's position before and after a commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionChange {
    pub product_id: String,
    pub from: Position,
    pub to: Position,
}

/// Event payload data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventPayload {
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<PositionChange>,
}

/// A single event in a category's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderEvent {
    /// Unique event identifier.
    pub id: String,

    /// Type of event.
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// When the event occurred (ISO 8601 UTC).
    pub timestamp: DateTime<Utc>,

    /// Who or what caused this event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// Event-specific payload.
    pub payload: EventPayload,
}

impl OrderEvent {
    /// Create a new event with auto-generated ID and current timestamp.
    #[must_use]
    pub fn new(event_type: EventType, payload: EventPayload) -> Self {
        Self {
            id: format!("evt_{}", Uuid::new_v4().as_simple()),
            event_type,
            timestamp: Utc::now(),
            actor: None,
            payload,
        }
    }

    /// Set the actor for this event.
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Create a PRODUCT_ADDED event.
    #[must_use]
    pub fn product_added(category_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self::new(
            EventType::ProductAdded,
            EventPayload {
                category_id: category_id.into(),
                changes: vec![PositionChange {
                    product_id: product_id.into(),
                    from: Position::Unset,
                    to: Position::Unset,
                }],
            },
        )
    }

    /// Record a committed batch, given the positions it replaced.
    #[must_use]
    pub fn committed(batch: &OrderBatch, previous: impl Fn(&str) -> Position) -> Self {
        let changes = batch
            .updates
            .iter()
            .map(|update| PositionChange {
                product_id: update.product_id.clone(),
                from: previous(&update.product_id),
                to: update.order,
            })
            .collect();

        Self::new(
            batch.kind.into(),
            EventPayload {
                category_id: batch.category_id.clone(),
                changes,
            },
        )
    }
}
