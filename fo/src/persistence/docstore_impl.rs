//! Docstore-backed persistence adapter

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docstore::{Filter, Store};
use tracing::debug;

use crate::domain::{HealthPoint, Intervention, Team, TeamStatus};

use super::adapter::{PersistenceAdapter, PersistenceError};

/// Adapter over the document store
pub struct DocstorePersistence {
    store: Arc<Store>,
}

impl DocstorePersistence {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn require_intervention(&self, intervention_id: &str) -> Result<Intervention, PersistenceError> {
        self.store
            .get::<Intervention>(intervention_id)?
            .ok_or_else(|| PersistenceError::NotFound {
                collection: "interventions",
                id: intervention_id.to_string(),
            })
    }
}

#[async_trait]
impl PersistenceAdapter for DocstorePersistence {
    async fn fetch_team(&self, team_id: &str) -> Result<Option<Team>, PersistenceError> {
        Ok(self.store.get::<Team>(team_id)?)
    }

    async fn create_intervention(&self, intervention: &Intervention) -> Result<(), PersistenceError> {
        debug!(id = %intervention.id, team = %intervention.team_name, "creating intervention");
        self.store.put(intervention)?;
        Ok(())
    }

    async fn update_team_status(
        &self,
        team_id: &str,
        status: TeamStatus,
        intervention_id: Option<&str>,
    ) -> Result<Team, PersistenceError> {
        let mut team = self
            .store
            .get::<Team>(team_id)?
            .ok_or_else(|| PersistenceError::NotFound {
                collection: "teams",
                id: team_id.to_string(),
            })?;

        team.status = status;
        team.active_intervention_id = intervention_id.map(str::to_string);
        team.last_updated = Utc::now();
        self.store.put(&team)?;

        debug!(team = %team.name, %status, "team status updated");
        Ok(team)
    }

    async fn complete_intervention(
        &self,
        intervention_id: &str,
        ended_at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        let mut intervention = self.require_intervention(intervention_id)?;
        intervention.complete(ended_at);
        self.store.put(&intervention)?;
        Ok(())
    }

    async fn record_transfer_destination(
        &self,
        intervention_id: &str,
        destination: &str,
    ) -> Result<(), PersistenceError> {
        let mut intervention = self.require_intervention(intervention_id)?;
        intervention.destination = Some(destination.to_string());
        intervention.last_updated = Utc::now();
        self.store.put(&intervention)?;
        Ok(())
    }

    async fn list_health_points(&self, event_id: &str) -> Result<Vec<HealthPoint>, PersistenceError> {
        Ok(self.store.list::<HealthPoint>(&[Filter::eq("event_id", event_id)])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_team_status_bumps_timestamp() {
        let store = Arc::new(Store::new());
        let team = Team::new("SAP-001", "event-1", "admin-1");
        store.put(&team).unwrap();

        let adapter = DocstorePersistence::new(store);
        let updated = adapter
            .update_team_status(&team.id, TeamStatus::Active, Some("int-1"))
            .await
            .unwrap();

        assert_eq!(updated.status, TeamStatus::Active);
        assert_eq!(updated.active_intervention_id.as_deref(), Some("int-1"));
        assert!(updated.last_updated >= team.last_updated);
    }

    #[tokio::test]
    async fn test_update_missing_team_is_not_found() {
        let adapter = DocstorePersistence::new(Arc::new(Store::new()));
        let err = adapter
            .update_team_status("ghost", TeamStatus::Active, None)
            .await
            .unwrap_err();

        assert!(matches!(err, PersistenceError::NotFound { collection: "teams", .. }));
    }

    #[tokio::test]
    async fn test_complete_intervention_roundtrip() {
        let store = Arc::new(Store::new());
        let team = Team::new("SAP-001", "event-1", "admin-1");
        let intervention = Intervention::begin(&team, Utc::now());
        store.put(&intervention).unwrap();

        let adapter = DocstorePersistence::new(store.clone());
        let ended = Utc::now();
        adapter.complete_intervention(&intervention.id, ended).await.unwrap();

        let stored: Intervention = store.get(&intervention.id).unwrap().unwrap();
        assert_eq!(stored.ended_at, Some(ended));
        assert!(!stored.is_open());
    }
}
