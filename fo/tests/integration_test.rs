//! Integration tests for FieldOps
//!
//! End-to-end flows across the hold controllers, confirmation gate,
//! lifecycle service and roster services, over a shared in-memory
//! store.

use std::sync::Arc;
use std::time::Duration;

use docstore::Store;
use fieldops::config::HoldConfig;
use fieldops::confirm::{ConfirmationPrompt, Decision};
use fieldops::domain::{HealthPoint, Intervention, InterventionStatus, Team, TeamStatus};
use fieldops::feedback::{FeedbackKind, RecordingFeedback};
use fieldops::hold::{HoldKind, HoldTimings, HoldToConfirmController};
use fieldops::lifecycle::{LifecycleAction, LifecycleService, TransitionError};
use fieldops::panel::InterventionPanel;
use fieldops::persistence::DocstorePersistence;
use fieldops::roster::{EventService, NewEvent, TeamService, VolunteerService};

fn fast_hold() -> HoldConfig {
    HoldConfig {
        start_hold_ms: 40,
        terminate_hold_ms: 30,
        transfer_hold_ms: 30,
        safety_margin_ms: 20,
        tick_ms: 5,
        decay_ms: 10,
    }
}

fn stack(
    store: &Arc<Store>,
    team_id: &str,
    hold: &HoldConfig,
) -> (Arc<InterventionPanel>, Arc<LifecycleService>, Arc<RecordingFeedback>) {
    let feedback = Arc::new(RecordingFeedback::new());
    let adapter = Arc::new(DocstorePersistence::new(store.clone()));
    let service = Arc::new(LifecycleService::new(adapter, feedback.clone()));
    let prompt = Arc::new(ConfirmationPrompt::new());
    let panel = Arc::new(InterventionPanel::new(
        team_id,
        service.clone(),
        prompt,
        feedback.clone(),
        hold,
    ));
    (panel, service, feedback)
}

fn accept_next(panel: &Arc<InterventionPanel>) -> tokio::task::JoinHandle<()> {
    let panel = panel.clone();
    tokio::spawn(async move {
        while panel.prompt().open_message().is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panel.prompt().resolve(Decision::Accepted).unwrap();
    })
}

async fn hold_and_accept(panel: &Arc<InterventionPanel>, kind: HoldKind, destination: Option<&str>) -> Team {
    panel.press(kind).await.unwrap();
    let completed = tokio::time::timeout(Duration::from_millis(1000), panel.next_completion())
        .await
        .expect("hold should complete")
        .expect("completion channel open");
    assert_eq!(completed, kind);

    let resolver = accept_next(panel);
    let team = panel
        .confirm(kind, destination)
        .await
        .unwrap()
        .expect("confirmation accepted");
    resolver.await.unwrap();
    team
}

// =============================================================================
// Hold + confirm + transition flows
// =============================================================================

/// The safety-net scenario at real durations: a 3000ms hold whose
/// progress ticker cannot finish (tick far past the hold), so only the
/// fallback timer at 3100ms can claim completion - exactly once - and
/// the accepted confirmation starts the intervention.
#[tokio::test]
async fn test_fallback_timer_drives_start_at_real_durations() {
    let store = Arc::new(Store::new());
    let team = Team::new("SAP-001", "event-1", "admin-1");
    store.put(&team).unwrap();

    let feedback = Arc::new(RecordingFeedback::new());
    let timings = HoldTimings::from_millis(3000, 100, 10_000, 200);
    let controller = HoldToConfirmController::new(HoldKind::Start, timings, feedback.clone());

    let adapter = Arc::new(DocstorePersistence::new(store.clone()));
    let service = Arc::new(LifecycleService::new(adapter, feedback.clone()));

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    controller.start(move || {
        let _ = done_tx.send(());
    });

    tokio::time::timeout(Duration::from_millis(3600), done_rx)
        .await
        .expect("fallback should fire around 3100ms")
        .expect("completion delivered");

    // Exactly one completion pulse despite two racing mechanisms
    assert_eq!(feedback.count_of(FeedbackKind::Success), 1);

    let updated = service
        .execute(&team.id, LifecycleAction::StartIntervention)
        .await
        .unwrap();
    assert_eq!(updated.status, TeamStatus::Active);
    assert!(updated.active_intervention_id.is_some());
}

#[tokio::test]
async fn test_full_intervention_lifecycle_through_panel() {
    let store = Arc::new(Store::new());
    let team = Team::new("SAP-001", "event-1", "admin-1");
    store.put(&team).unwrap();
    store.put(&HealthPoint::new("HP-01", "event-1")).unwrap();

    let hold = fast_hold();
    let (panel, _service, _feedback) = stack(&store, &team.id, &hold);

    // Free -> Active
    let active = hold_and_accept(&panel, HoldKind::Start, None).await;
    assert_eq!(active.status, TeamStatus::Active);
    let intervention_id = active.active_intervention_id.clone().unwrap();

    // Active -> Transferring, intervention unchanged
    let transferring = hold_and_accept(&panel, HoldKind::Transfer, Some("HP-01")).await;
    assert_eq!(transferring.status, TeamStatus::Transferring);
    assert_eq!(
        transferring.active_intervention_id.as_deref(),
        Some(intervention_id.as_str())
    );

    let mid: Intervention = store.get(&intervention_id).unwrap().unwrap();
    assert_eq!(mid.destination.as_deref(), Some("HP-01"));
    assert!(mid.is_open());

    // Transferring -> Free, intervention completed and detached
    let freed = hold_and_accept(&panel, HoldKind::Terminate, None).await;
    assert_eq!(freed.status, TeamStatus::Free);
    assert!(freed.active_intervention_id.is_none());

    let closed: Intervention = store.get(&intervention_id).unwrap().unwrap();
    assert_eq!(closed.status, InterventionStatus::Completed);
    assert!(closed.ended_at.is_some());

    // Guards re-evaluated: only start is enabled again
    let states = panel.control_states().await.unwrap();
    assert!(states.start_enabled);
    assert!(!states.terminate_enabled);
    assert!(!states.transfer_enabled);
}

#[tokio::test]
async fn test_stale_press_from_second_device_is_rejected() {
    let store = Arc::new(Store::new());
    let team = Team::new("SAP-001", "event-1", "admin-1");
    store.put(&team).unwrap();

    // Two devices looking at the same team
    let feedback_a = Arc::new(RecordingFeedback::new());
    let service_a = Arc::new(LifecycleService::new(
        Arc::new(DocstorePersistence::new(store.clone())),
        feedback_a,
    ));
    let feedback_b = Arc::new(RecordingFeedback::new());
    let service_b = Arc::new(LifecycleService::new(
        Arc::new(DocstorePersistence::new(store.clone())),
        feedback_b.clone(),
    ));

    // Device A wins the race
    service_a
        .execute(&team.id, LifecycleAction::StartIntervention)
        .await
        .unwrap();

    // Device B pressed while the team still looked free; the service
    // re-reads at transition time and rejects
    let err = service_b
        .execute(&team.id, LifecycleAction::StartIntervention)
        .await
        .unwrap_err();
    assert!(matches!(err, TransitionError::IllegalTransition { .. }));
    assert_eq!(feedback_b.count_of(FeedbackKind::Warning), 1);

    // The winning intervention is untouched
    let stored: Team = store.get(&team.id).unwrap().unwrap();
    assert_eq!(stored.status, TeamStatus::Active);
}

#[tokio::test]
async fn test_rejected_confirmation_cancels_cleanly() {
    let store = Arc::new(Store::new());
    let team = Team::new("SAP-001", "event-1", "admin-1");
    store.put(&team).unwrap();

    let hold = fast_hold();
    let (panel, _service, feedback) = stack(&store, &team.id, &hold);

    panel.press(HoldKind::Start).await.unwrap();
    tokio::time::timeout(Duration::from_millis(1000), panel.next_completion())
        .await
        .expect("hold should complete")
        .expect("completion channel open");

    let rejecter = {
        let panel = panel.clone();
        tokio::spawn(async move {
            while panel.prompt().open_message().is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            panel.prompt().resolve(Decision::Rejected).unwrap();
        })
    };

    let outcome = panel.confirm(HoldKind::Start, None).await.unwrap();
    rejecter.await.unwrap();

    assert!(outcome.is_none());
    let stored: Team = store.get(&team.id).unwrap().unwrap();
    assert_eq!(stored.status, TeamStatus::Free);
    assert!(stored.active_intervention_id.is_none());
    assert_eq!(store.count("interventions"), 0);
    assert_eq!(feedback.count_of(FeedbackKind::Success), 1); // the hold completion only
}

// =============================================================================
// Roster flows
// =============================================================================

#[tokio::test]
async fn test_event_team_volunteer_setup_then_intervention() {
    let store = Arc::new(Store::new());

    let events = EventService::new(store.clone());
    let teams = TeamService::new(store.clone());
    let volunteers = VolunteerService::new(store.clone());

    let event = events
        .create(NewEvent {
            name: "Maratona".to_string(),
            location: "Lungomare".to_string(),
            date: Some("2026-09-12".to_string()),
            start_time: None,
            end_time: None,
            level: None,
            notes: None,
            created_by: "admin-1".to_string(),
        })
        .unwrap();

    for uid in ["uid-1", "uid-2"] {
        let mut profile = fieldops::domain::VolunteerProfile::new(uid);
        profile.display_name = Some(format!("Volunteer {uid}"));
        volunteers.upsert(&profile).unwrap();
    }

    let team = teams
        .create(&event.id, None, &["uid-1".to_string(), "uid-2".to_string()], "admin-1")
        .unwrap();
    assert_eq!(team.name, "SAP-001");

    store.put(&HealthPoint::new("HP-01", &event.id)).unwrap();

    let hold = fast_hold();
    let (panel, _service, _feedback) = stack(&store, &team.id, &hold);

    let active = hold_and_accept(&panel, HoldKind::Start, None).await;
    assert_eq!(active.status, TeamStatus::Active);

    // Roster view reflects the running intervention
    let joined = teams.teams_with_members(&event.id).unwrap();
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].team.status, TeamStatus::Active);
    assert_eq!(joined[0].members.len(), 2);

    // Members stay assigned through the intervention
    let available = volunteers.available().unwrap();
    assert!(available.iter().all(|v| v.current_team_name.as_deref() == Some("SAP-001")));
}
