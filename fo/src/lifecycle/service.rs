//! Lifecycle service - applies planned transitions through the adapter
//!
//! The service owns the only suspension point in the core: the
//! persistence write issued on a successful transition. While that
//! write is in flight the team's controls stay disabled, enforced here
//! rather than trusted to the screen.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::{HealthPoint, Team, TeamStatus};
use crate::feedback::{FeedbackKind, FeedbackSink};
use crate::persistence::PersistenceAdapter;

use super::machine::{LifecycleAction, TeamStateMachine, TransitionError};

/// Applies lifecycle transitions for teams
pub struct LifecycleService {
    adapter: Arc<dyn PersistenceAdapter>,
    feedback: Arc<dyn FeedbackSink>,
    in_flight: Mutex<()>,
}

impl LifecycleService {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, feedback: Arc<dyn FeedbackSink>) -> Self {
        Self {
            adapter,
            feedback,
            in_flight: Mutex::new(()),
        }
    }

    /// Current team state, straight from the backend
    pub async fn fetch(&self, team_id: &str) -> Result<Team, TransitionError> {
        self.adapter
            .fetch_team(team_id)
            .await?
            .ok_or_else(|| TransitionError::TeamNotFound(team_id.to_string()))
    }

    /// Transfer destinations available at an event
    pub async fn destinations(&self, event_id: &str) -> Result<Vec<HealthPoint>, TransitionError> {
        Ok(self.adapter.list_health_points(event_id).await?)
    }

    /// Whether a status write is currently in flight
    pub fn is_busy(&self) -> bool {
        match self.in_flight.try_lock() {
            Ok(_guard) => false,
            Err(_) => true,
        }
    }

    /// Execute an action against a team: re-read current state, plan
    /// the transition, and apply the write intents.
    ///
    /// The team state is re-fetched here, not taken from the caller:
    /// another device may have moved the team since the press began,
    /// and a stale transition must surface as a rejection, not a
    /// corrupting write.
    pub async fn execute(&self, team_id: &str, action: LifecycleAction) -> Result<Team, TransitionError> {
        let result = self.execute_inner(team_id, action).await;

        match &result {
            Ok(team) => {
                self.feedback.pulse(FeedbackKind::Success);
                info!(team = %team.name, status = %team.status, "transition applied");
            }
            Err(TransitionError::IllegalTransition { status, action }) => {
                self.feedback.pulse(FeedbackKind::Warning);
                warn!(%status, %action, "transition rejected by guard");
            }
            Err(TransitionError::MissingDestination) | Err(TransitionError::WriteInFlight) => {
                self.feedback.pulse(FeedbackKind::Warning);
            }
            Err(err) => {
                self.feedback.pulse(FeedbackKind::Error);
                warn!(error = %err, "transition failed");
            }
        }

        result
    }

    async fn execute_inner(&self, team_id: &str, action: LifecycleAction) -> Result<Team, TransitionError> {
        // One write at a time per service; a second request while one
        // is in flight mirrors a press on a disabled control.
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Err(TransitionError::WriteInFlight);
        };

        let team = self.fetch(team_id).await?;
        let mut machine = TeamStateMachine::new(team);
        let outcome = machine.transition(action, Utc::now())?;

        if let Some(ref intervention) = outcome.created {
            self.adapter.create_intervention(intervention).await?;
        }

        if let Some(ref completion) = outcome.completed {
            self.adapter
                .complete_intervention(&completion.intervention_id, completion.ended_at)
                .await?;
        }

        if let (Some(destination), Some(intervention_id)) = (
            outcome.destination.as_deref(),
            outcome.team.active_intervention_id.as_deref(),
        ) {
            self.adapter
                .record_transfer_destination(intervention_id, destination)
                .await?;
        }

        let team = self
            .adapter
            .update_team_status(
                &outcome.team.id,
                outcome.team.status,
                outcome.team.active_intervention_id.as_deref(),
            )
            .await?;

        Ok(team)
    }

    /// Short user-facing notice for a successful transition
    pub fn toast_for(team: &Team) -> String {
        match team.status {
            TeamStatus::Active => format!("{} has started an intervention", team.name),
            TeamStatus::Transferring => format!("{} is transferring to a health point", team.name),
            TeamStatus::Free => format!("{} is available again", team.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::DateTime;
    use docstore::Store;

    use crate::domain::{HealthPoint, Intervention, InterventionStatus};
    use crate::feedback::RecordingFeedback;
    use crate::persistence::{DocstorePersistence, PersistenceError};

    use super::*;

    fn seeded() -> (Arc<Store>, Team) {
        let store = Arc::new(Store::new());
        let team = Team::new("SAP-001", "event-1", "admin-1");
        store.put(&team).unwrap();
        (store, team)
    }

    fn service_over(store: Arc<Store>) -> (Arc<LifecycleService>, Arc<RecordingFeedback>) {
        let feedback = Arc::new(RecordingFeedback::new());
        let adapter = Arc::new(DocstorePersistence::new(store));
        let service = Arc::new(LifecycleService::new(adapter, feedback.clone()));
        (service, feedback)
    }

    #[tokio::test]
    async fn test_start_writes_team_and_intervention() {
        let (store, team) = seeded();
        let (service, feedback) = service_over(store.clone());

        let updated = service
            .execute(&team.id, LifecycleAction::StartIntervention)
            .await
            .unwrap();

        assert_eq!(updated.status, TeamStatus::Active);
        let intervention_id = updated.active_intervention_id.expect("attached");
        let stored: Intervention = store.get(&intervention_id).unwrap().unwrap();
        assert!(stored.is_open());
        assert_eq!(feedback.count_of(FeedbackKind::Success), 1);
    }

    #[tokio::test]
    async fn test_terminate_completes_and_detaches() {
        let (store, team) = seeded();
        let (service, _feedback) = service_over(store.clone());

        let active = service
            .execute(&team.id, LifecycleAction::StartIntervention)
            .await
            .unwrap();
        let intervention_id = active.active_intervention_id.clone().unwrap();

        let freed = service.execute(&team.id, LifecycleAction::Terminate).await.unwrap();
        assert_eq!(freed.status, TeamStatus::Free);
        assert!(freed.active_intervention_id.is_none());

        let stored: Intervention = store.get(&intervention_id).unwrap().unwrap();
        assert_eq!(stored.status, InterventionStatus::Completed);
        assert!(stored.ended_at.is_some());
    }

    #[tokio::test]
    async fn test_transfer_records_destination() {
        let (store, team) = seeded();
        store.put(&HealthPoint::new("HP-01", "event-1")).unwrap();
        let (service, _feedback) = service_over(store.clone());

        let active = service
            .execute(&team.id, LifecycleAction::StartIntervention)
            .await
            .unwrap();
        let intervention_id = active.active_intervention_id.clone().unwrap();

        let transferring = service
            .execute(
                &team.id,
                LifecycleAction::BeginTransfer {
                    destination: "HP-01".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(transferring.status, TeamStatus::Transferring);
        assert_eq!(transferring.active_intervention_id.as_deref(), Some(intervention_id.as_str()));

        let stored: Intervention = store.get(&intervention_id).unwrap().unwrap();
        assert_eq!(stored.destination.as_deref(), Some("HP-01"));
        assert!(stored.is_open());
    }

    #[tokio::test]
    async fn test_illegal_transition_pulses_warning_and_changes_nothing() {
        let (store, team) = seeded();
        let (service, feedback) = service_over(store.clone());

        let err = service.execute(&team.id, LifecycleAction::Terminate).await.unwrap_err();
        assert!(matches!(err, TransitionError::IllegalTransition { .. }));

        let stored: Team = store.get(&team.id).unwrap().unwrap();
        assert_eq!(stored.status, TeamStatus::Free);
        assert_eq!(feedback.count_of(FeedbackKind::Warning), 1);
        assert_eq!(feedback.count_of(FeedbackKind::Success), 0);
    }

    #[tokio::test]
    async fn test_unknown_team_is_not_found() {
        let (service, _feedback) = service_over(Arc::new(Store::new()));
        let err = service
            .execute("ghost", LifecycleAction::StartIntervention)
            .await
            .unwrap_err();
        assert!(matches!(err, TransitionError::TeamNotFound(_)));
    }

    /// Adapter that blocks on team fetch so tests can observe the
    /// in-flight guard deterministically.
    struct SlowAdapter {
        inner: DocstorePersistence,
        delay: Duration,
    }

    #[async_trait]
    impl PersistenceAdapter for SlowAdapter {
        async fn fetch_team(&self, team_id: &str) -> Result<Option<Team>, PersistenceError> {
            tokio::time::sleep(self.delay).await;
            self.inner.fetch_team(team_id).await
        }

        async fn create_intervention(&self, intervention: &Intervention) -> Result<(), PersistenceError> {
            self.inner.create_intervention(intervention).await
        }

        async fn update_team_status(
            &self,
            team_id: &str,
            status: TeamStatus,
            intervention_id: Option<&str>,
        ) -> Result<Team, PersistenceError> {
            self.inner.update_team_status(team_id, status, intervention_id).await
        }

        async fn complete_intervention(
            &self,
            intervention_id: &str,
            ended_at: DateTime<Utc>,
        ) -> Result<(), PersistenceError> {
            self.inner.complete_intervention(intervention_id, ended_at).await
        }

        async fn record_transfer_destination(
            &self,
            intervention_id: &str,
            destination: &str,
        ) -> Result<(), PersistenceError> {
            self.inner.record_transfer_destination(intervention_id, destination).await
        }

        async fn list_health_points(&self, event_id: &str) -> Result<Vec<HealthPoint>, PersistenceError> {
            self.inner.list_health_points(event_id).await
        }
    }

    /// Adapter whose team-status write always fails
    struct FailingWrites {
        inner: DocstorePersistence,
    }

    #[async_trait]
    impl PersistenceAdapter for FailingWrites {
        async fn fetch_team(&self, team_id: &str) -> Result<Option<Team>, PersistenceError> {
            self.inner.fetch_team(team_id).await
        }

        async fn create_intervention(&self, intervention: &Intervention) -> Result<(), PersistenceError> {
            self.inner.create_intervention(intervention).await
        }

        async fn update_team_status(
            &self,
            _team_id: &str,
            _status: TeamStatus,
            _intervention_id: Option<&str>,
        ) -> Result<Team, PersistenceError> {
            Err(PersistenceError::Unavailable("backend offline".to_string()))
        }

        async fn complete_intervention(
            &self,
            intervention_id: &str,
            ended_at: DateTime<Utc>,
        ) -> Result<(), PersistenceError> {
            self.inner.complete_intervention(intervention_id, ended_at).await
        }

        async fn record_transfer_destination(
            &self,
            intervention_id: &str,
            destination: &str,
        ) -> Result<(), PersistenceError> {
            self.inner.record_transfer_destination(intervention_id, destination).await
        }

        async fn list_health_points(&self, event_id: &str) -> Result<Vec<HealthPoint>, PersistenceError> {
            self.inner.list_health_points(event_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_write_pulses_error_and_is_not_retried() {
        let (store, team) = seeded();
        let feedback = Arc::new(RecordingFeedback::new());
        let adapter = Arc::new(FailingWrites {
            inner: DocstorePersistence::new(store.clone()),
        });
        let service = LifecycleService::new(adapter, feedback.clone());

        let err = service
            .execute(&team.id, LifecycleAction::StartIntervention)
            .await
            .unwrap_err();

        assert!(matches!(err, TransitionError::WriteFailure(_)));
        assert_eq!(feedback.count_of(FeedbackKind::Error), 1);
        assert_eq!(feedback.count_of(FeedbackKind::Success), 0);

        // The team document itself was never touched
        let stored: Team = store.get(&team.id).unwrap().unwrap();
        assert_eq!(stored.status, TeamStatus::Free);
    }

    #[tokio::test]
    async fn test_second_overlapping_write_is_rejected() {
        let (store, team) = seeded();
        let adapter = Arc::new(SlowAdapter {
            inner: DocstorePersistence::new(store),
            delay: Duration::from_millis(100),
        });
        let service = Arc::new(LifecycleService::new(adapter, Arc::new(RecordingFeedback::new())));

        let first = {
            let service = service.clone();
            let team_id = team.id.clone();
            tokio::spawn(async move { service.execute(&team_id, LifecycleAction::StartIntervention).await })
        };

        // Give the first call time to take the in-flight guard
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(service.is_busy());

        let err = service.execute(&team.id, LifecycleAction::Terminate).await.unwrap_err();
        assert!(matches!(err, TransitionError::WriteInFlight));

        let first = first.await.unwrap().unwrap();
        assert_eq!(first.status, TeamStatus::Active);
        assert!(!service.is_busy());
    }
}
