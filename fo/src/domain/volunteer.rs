//! Volunteer profile domain type
//!
//! Profiles are keyed by the identity provider's user id; the identity
//! provider itself (sign-in, sessions) is an external collaborator.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use docstore::{IndexValue, Record};
use serde::{Deserialize, Serialize};

/// Role within the organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerRole {
    #[default]
    User,
    Admin,
}

/// A volunteer profile as stored in the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerProfile {
    /// Identity-provider user id
    pub id: String,

    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,

    pub role: VolunteerRole,
    pub active: bool,

    /// Team the volunteer is currently assigned to, if any
    pub assigned_team: Option<String>,

    /// Event the volunteer is currently deployed at, if any
    pub active_event: Option<String>,

    pub qualification: Option<String>,
    pub phone: Option<String>,

    pub last_updated: DateTime<Utc>,
}

impl VolunteerProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            first_name: None,
            last_name: None,
            display_name: None,
            role: VolunteerRole::User,
            active: true,
            assigned_team: None,
            active_event: None,
            qualification: None,
            phone: None,
            last_updated: Utc::now(),
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_team.is_some()
    }

    /// Best display label available: display name, then first+last,
    /// then email, then the raw id
    pub fn full_name(&self) -> String {
        if let Some(ref name) = self.display_name {
            return name.clone();
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone().unwrap_or_else(|| self.id.clone()),
        }
    }
}

impl Record for VolunteerProfile {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.last_updated.timestamp_millis()
    }

    fn collection_name() -> &'static str {
        "users"
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("active".to_string(), IndexValue::Bool(self.active));
        if let Some(ref team) = self.assigned_team {
            fields.insert("assigned_team".to_string(), IndexValue::String(team.clone()));
        }
        if let Some(ref event) = self.active_event {
            fields.insert("active_event".to_string(), IndexValue::String(event.clone()));
        }
        fields
    }
}
