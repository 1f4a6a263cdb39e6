//! Adapter trait for team/intervention writes
//!
//! Every call is a single-document or small-batch operation; no
//! multi-team transactions. The backend is last-writer-wins, so
//! callers re-read state at transition time instead of holding locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{HealthPoint, Intervention, Team, TeamStatus};

/// Errors from persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: &'static str, id: String },

    #[error("Store error: {0}")]
    Store(#[from] docstore::StoreError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Reads and write-intents the lifecycle core issues
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Current team state, straight from the backend
    async fn fetch_team(&self, team_id: &str) -> Result<Option<Team>, PersistenceError>;

    /// Persist a freshly created intervention
    async fn create_intervention(&self, intervention: &Intervention) -> Result<(), PersistenceError>;

    /// Set a team's status and intervention reference, bumping its
    /// last-updated timestamp; returns the stored team
    async fn update_team_status(
        &self,
        team_id: &str,
        status: TeamStatus,
        intervention_id: Option<&str>,
    ) -> Result<Team, PersistenceError>;

    /// Mark an intervention completed
    async fn complete_intervention(
        &self,
        intervention_id: &str,
        ended_at: DateTime<Utc>,
    ) -> Result<(), PersistenceError>;

    /// Record the chosen destination on the active intervention
    async fn record_transfer_destination(
        &self,
        intervention_id: &str,
        destination: &str,
    ) -> Result<(), PersistenceError>;

    /// Transfer destinations available at an event
    async fn list_health_points(&self, event_id: &str) -> Result<Vec<HealthPoint>, PersistenceError>;
}
