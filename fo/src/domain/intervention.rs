//! Intervention domain type

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use docstore::{IndexValue, Record};
use serde::{Deserialize, Serialize};

use super::id::generate_id;
use super::team::Team;

/// Intervention lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterventionStatus {
    /// In progress, owned by its team
    #[default]
    Active,
    /// Concluded by the team
    Completed,
    /// Handed over to a health point
    TransferredOut,
}

impl std::fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::TransferredOut => write!(f, "transferred_out"),
        }
    }
}

/// A single intervention, created when a team goes active and closed
/// when the team returns to free
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervention {
    /// Generated at creation; time-based uniqueness
    pub id: String,

    /// Owning team
    pub team_id: String,

    /// Team display name at creation time, kept for reporting
    pub team_name: String,

    /// Owning event
    pub event_id: String,

    /// Lifecycle status
    pub status: InterventionStatus,

    /// Set at creation; immutable
    pub started_at: DateTime<Utc>,

    /// Set when the intervention is completed
    pub ended_at: Option<DateTime<Utc>>,

    /// Destination health point, recorded when a transfer begins
    pub destination: Option<String>,

    /// Free-form operator notes
    pub notes: Option<String>,

    /// Last mutation timestamp
    pub last_updated: DateTime<Utc>,
}

impl Intervention {
    /// Open a new intervention for a team
    pub fn begin(team: &Team, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_id("int", &team.name),
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            event_id: team.event_id.clone(),
            status: InterventionStatus::Active,
            started_at: now,
            ended_at: None,
            destination: None,
            notes: None,
            last_updated: now,
        }
    }

    /// Whether the intervention is still owned by its team
    pub fn is_open(&self) -> bool {
        matches!(self.status, InterventionStatus::Active)
    }

    /// Conclude the intervention
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = InterventionStatus::Completed;
        self.ended_at = Some(now);
        self.last_updated = now;
    }

    /// Elapsed whole minutes since start
    pub fn duration_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_minutes()
    }
}

impl Record for Intervention {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.last_updated.timestamp_millis()
    }

    fn collection_name() -> &'static str {
        "interventions"
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("team_id".to_string(), IndexValue::String(self.team_id.clone()));
        fields.insert("event_id".to_string(), IndexValue::String(self.event_id.clone()));
        fields.insert("status".to_string(), IndexValue::String(self.status.to_string()));
        fields
    }
}
