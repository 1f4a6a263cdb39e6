//! Intervention panel
//!
//! Binds the three hold controllers, the confirmation gate and the
//! lifecycle service for one team. This is everything a screen needs:
//! press/release per button, a completion stream, and the confirm
//! step that runs the actual transition.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::debug;

use crate::config::HoldConfig;
use crate::confirm::{ConfirmError, ConfirmationPrompt, Decision};
use crate::domain::{HealthPoint, Team};
use crate::feedback::{FeedbackKind, FeedbackSink};
use crate::hold::{HoldKind, HoldToConfirmController};
use crate::lifecycle::{LifecycleAction, LifecycleService, TransitionError};

/// Errors from panel operations
#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Confirm(#[from] ConfirmError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("No destination health points available")]
    NoDestinations,

    #[error("Transfer requires choosing a destination")]
    DestinationRequired,

    #[error("Unknown destination: {0}")]
    UnknownDestination(String),
}

/// Enabled/disabled state for the three controls
///
/// Re-evaluate after every transition; guards are mutually exclusive
/// by team status, and everything is disabled while a write is in
/// flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlStates {
    pub start_enabled: bool,
    pub terminate_enabled: bool,
    pub transfer_enabled: bool,
    pub busy: bool,
}

/// Screen-facing surface for one team's intervention controls
pub struct InterventionPanel {
    team_id: String,
    service: Arc<LifecycleService>,
    prompt: Arc<ConfirmationPrompt>,
    feedback: Arc<dyn FeedbackSink>,
    start_control: HoldToConfirmController,
    terminate_control: HoldToConfirmController,
    transfer_control: HoldToConfirmController,
    completed_tx: mpsc::Sender<HoldKind>,
    completed_rx: Mutex<mpsc::Receiver<HoldKind>>,
}

impl InterventionPanel {
    pub fn new(
        team_id: impl Into<String>,
        service: Arc<LifecycleService>,
        prompt: Arc<ConfirmationPrompt>,
        feedback: Arc<dyn FeedbackSink>,
        hold: &HoldConfig,
    ) -> Self {
        let (completed_tx, completed_rx) = mpsc::channel(8);
        Self {
            team_id: team_id.into(),
            service,
            prompt,
            feedback: feedback.clone(),
            start_control: HoldToConfirmController::new(
                HoldKind::Start,
                hold.timings_for(HoldKind::Start),
                feedback.clone(),
            ),
            terminate_control: HoldToConfirmController::new(
                HoldKind::Terminate,
                hold.timings_for(HoldKind::Terminate),
                feedback.clone(),
            ),
            transfer_control: HoldToConfirmController::new(
                HoldKind::Transfer,
                hold.timings_for(HoldKind::Transfer),
                feedback,
            ),
            completed_tx,
            completed_rx: Mutex::new(completed_rx),
        }
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    fn control(&self, kind: HoldKind) -> &HoldToConfirmController {
        match kind {
            HoldKind::Start => &self.start_control,
            HoldKind::Terminate => &self.terminate_control,
            HoldKind::Transfer => &self.transfer_control,
        }
    }

    /// Current button states, from the backend's view of the team
    pub async fn control_states(&self) -> Result<ControlStates, TransitionError> {
        let team = self.service.fetch(&self.team_id).await?;
        let busy = self.service.is_busy();
        Ok(ControlStates {
            start_enabled: team.status.can_start() && !busy,
            terminate_enabled: team.status.can_terminate() && !busy,
            transfer_enabled: team.status.can_transfer() && !busy,
            busy,
        })
    }

    /// Press-down on a control
    ///
    /// A press on a disabled control is a no-op, mirroring the
    /// disabled button in the UI. The guard is checked again at
    /// transition time regardless.
    pub async fn press(&self, kind: HoldKind) -> Result<(), TransitionError> {
        let states = self.control_states().await?;
        let enabled = match kind {
            HoldKind::Start => states.start_enabled,
            HoldKind::Terminate => states.terminate_enabled,
            HoldKind::Transfer => states.transfer_enabled,
        };
        if !enabled {
            debug!(%kind, "press ignored: control disabled");
            return Ok(());
        }

        let tx = self.completed_tx.clone();
        self.control(kind).start(move || {
            let _ = tx.try_send(kind);
        });
        Ok(())
    }

    /// Press-up on a control
    pub fn release(&self, kind: HoldKind) {
        self.control(kind).cancel();
    }

    /// Next completed hold, in press order
    pub async fn next_completion(&self) -> Option<HoldKind> {
        self.completed_rx.lock().await.recv().await
    }

    /// Progress snapshot for a control's indicator
    pub fn progress(&self, kind: HoldKind) -> f64 {
        self.control(kind).progress()
    }

    /// Watch channel for a control's indicator
    pub fn subscribe_progress(&self, kind: HoldKind) -> watch::Receiver<f64> {
        self.control(kind).subscribe()
    }

    /// The confirmation gate, for whatever renders the modal
    pub fn prompt(&self) -> &ConfirmationPrompt {
        &self.prompt
    }

    /// Destinations offered for a transfer
    pub async fn transfer_destinations(&self) -> Result<Vec<HealthPoint>, PanelError> {
        let team = self.service.fetch(&self.team_id).await?;
        Ok(self.service.destinations(&team.event_id).await?)
    }

    /// Run the confirm step for a completed hold
    ///
    /// Opens the gate, and on acceptance executes the transition.
    /// Rejection resolves to `Ok(None)` with domain state untouched.
    pub async fn confirm(&self, kind: HoldKind, destination: Option<&str>) -> Result<Option<Team>, PanelError> {
        let team = self.service.fetch(&self.team_id).await?;

        let (action, message) = match kind {
            HoldKind::Start => (
                LifecycleAction::StartIntervention,
                format!("Start a new intervention?\n\nTeam: {}", team.name),
            ),
            HoldKind::Terminate => (
                LifecycleAction::Terminate,
                format!("Conclude the intervention in progress?\n\nTeam: {}", team.name),
            ),
            HoldKind::Transfer => {
                let options = self.transfer_destinations().await?;
                if options.is_empty() {
                    return Err(PanelError::NoDestinations);
                }
                let chosen = destination.ok_or(PanelError::DestinationRequired)?;
                let known = options.iter().any(|hp| hp.name == chosen || hp.id == chosen);
                if !known {
                    return Err(PanelError::UnknownDestination(chosen.to_string()));
                }
                (
                    LifecycleAction::BeginTransfer {
                        destination: chosen.to_string(),
                    },
                    format!("Transfer the patient to {}?\n\nTeam: {}", chosen, team.name),
                )
            }
        };

        match self.prompt.ask(message).await? {
            Decision::Rejected => {
                debug!(%kind, "confirmation rejected");
                self.feedback.pulse(FeedbackKind::Cancelled);
                Ok(None)
            }
            Decision::Accepted => {
                let team = self.service.execute(&self.team_id, action).await?;
                Ok(Some(team))
            }
        }
    }
}
