//! Health point domain type
//!
//! Transfer destinations. The core only needs these as an opaque,
//! listable destination set; their own reception workflow lives with
//! the backend.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use docstore::{IndexValue, Record};
use serde::{Deserialize, Serialize};

use super::id::generate_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthPointStatus {
    #[default]
    Free,
    Receiving,
    Active,
}

impl std::fmt::Display for HealthPointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Receiving => write!(f, "receiving"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// A staffed location teams can transfer patients to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPoint {
    pub id: String,
    pub name: String,
    pub event_id: String,
    pub status: HealthPointStatus,
    pub last_updated: DateTime<Utc>,
}

impl HealthPoint {
    pub fn new(name: impl Into<String>, event_id: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: generate_id("hp", &name),
            name,
            event_id: event_id.into(),
            status: HealthPointStatus::Free,
            last_updated: Utc::now(),
        }
    }
}

impl Record for HealthPoint {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.last_updated.timestamp_millis()
    }

    fn collection_name() -> &'static str {
        "health_points"
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("event_id".to_string(), IndexValue::String(self.event_id.clone()));
        fields.insert("status".to_string(), IndexValue::String(self.status.to_string()));
        fields
    }
}
