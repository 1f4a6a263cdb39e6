//! Event domain type

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use docstore::{IndexValue, Record};
use serde::{Deserialize, Serialize};

use super::id::generate_id;

/// Expected operational intensity of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for EventLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown level: {}. Use: low, medium, or high", s)),
        }
    }
}

/// A live event (race, festival, emergency drill) teams operate at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub location: String,

    /// Calendar date, free-form (the source keeps these as entered)
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,

    pub level: Option<EventLevel>,
    pub notes: Option<String>,

    /// Admin who created the event
    pub created_by: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(name: impl Into<String>, location: impl Into<String>, created_by: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: generate_id("event", &name),
            name,
            location: location.into(),
            date: None,
            start_time: None,
            end_time: None,
            level: None,
            notes: None,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Record for Event {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at.timestamp_millis()
    }

    fn collection_name() -> &'static str {
        "events"
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("created_by".to_string(), IndexValue::String(self.created_by.clone()));
        if let Some(level) = self.level {
            fields.insert("level".to_string(), IndexValue::String(level.to_string()));
        }
        fields
    }
}
