//! Team domain type
//!
//! A team (squad) is the aggregate root for intervention tracking: its
//! `status` is the only field the lifecycle state machine mutates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use docstore::{IndexValue, Record};
use serde::{Deserialize, Serialize};

use super::id::generate_id;

/// Team availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    /// Available for a new intervention
    #[default]
    Free,
    /// Intervention in progress
    Active,
    /// Transferring a patient to a health point
    Transferring,
}

impl TeamStatus {
    /// A new intervention may begin only from Free
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Free)
    }

    /// An open intervention (active or transferring) may be terminated
    pub fn can_terminate(&self) -> bool {
        !matches!(self, Self::Free)
    }

    /// A transfer may begin only while actively intervening; a second
    /// transfer mid-transfer is not allowed
    pub fn can_transfer(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Active => write!(f, "active"),
            Self::Transferring => write!(f, "transferring"),
        }
    }
}

/// A rescue squad roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier, stable for the lifetime of the event
    pub id: String,

    /// Display label, unique within an event (e.g. "SAP-001")
    pub name: String,

    /// Owning event
    pub event_id: String,

    /// Volunteer ids in display order; business logic treats this as a set
    pub members: Vec<String>,

    /// Current availability status
    pub status: TeamStatus,

    /// Current intervention; present iff status != Free
    pub active_intervention_id: Option<String>,

    /// Admin who created the team
    pub created_by: String,

    /// Soft-delete flag: inactive teams are hidden, not removed
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Set on every status transition and roster change
    pub last_updated: DateTime<Utc>,
}

impl Team {
    /// Create a new free team with no members
    pub fn new(name: impl Into<String>, event_id: impl Into<String>, created_by: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: generate_id("team", &name),
            name,
            event_id: event_id.into(),
            members: Vec::new(),
            status: TeamStatus::Free,
            active_intervention_id: None,
            created_by: created_by.into(),
            active: true,
            created_at: now,
            last_updated: now,
        }
    }

    /// Whether the team currently holds an intervention
    pub fn holds_intervention(&self) -> bool {
        self.active_intervention_id.is_some()
    }

    /// The status/intervention coupling: an intervention id is present
    /// exactly when the team is not free
    pub fn invariant_holds(&self) -> bool {
        self.active_intervention_id.is_some() == (self.status != TeamStatus::Free)
    }
}

impl Record for Team {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.last_updated.timestamp_millis()
    }

    fn collection_name() -> &'static str {
        "teams"
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("event_id".to_string(), IndexValue::String(self.event_id.clone()));
        fields.insert("status".to_string(), IndexValue::String(self.status.to_string()));
        fields.insert("active".to_string(), IndexValue::Bool(self.active));
        fields
    }
}
