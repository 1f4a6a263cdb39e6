//! Team status state machine
//!
//! The transition table for a single team:
//!
//! | From         | Action            | To           | Side effect                      |
//! |--------------|-------------------|--------------|----------------------------------|
//! | Free         | StartIntervention | Active       | create intervention, attach      |
//! | Active       | Terminate         | Free         | complete intervention, detach    |
//! | Transferring | Terminate         | Free         | complete intervention, detach    |
//! | Active       | BeginTransfer     | Transferring | record destination               |
//!
//! Every other (status, action) pair is rejected with state unchanged.
//! Illegal transitions are ordinary results, not panics: they are
//! reachable through UI races and stale reads from other devices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{Intervention, Team, TeamStatus};
use crate::persistence::PersistenceError;

/// An action requested against a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Open a new intervention
    StartIntervention,
    /// Conclude the current intervention
    Terminate,
    /// Begin transferring the patient to a health point
    BeginTransfer { destination: String },
}

impl LifecycleAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::StartIntervention => ActionKind::Start,
            Self::Terminate => ActionKind::Terminate,
            Self::BeginTransfer { .. } => ActionKind::Transfer,
        }
    }
}

/// Action discriminant, used in error messages and display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Start,
    Terminate,
    Transfer,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start intervention"),
            Self::Terminate => write!(f, "terminate intervention"),
            Self::Transfer => write!(f, "begin transfer"),
        }
    }
}

/// Errors from transition planning and application
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Cannot {action} while team is {status}")]
    IllegalTransition { status: TeamStatus, action: ActionKind },

    #[error("Transfer requires a destination health point")]
    MissingDestination,

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Another status write is already in flight")]
    WriteInFlight,

    #[error("Team state corrupt: {0}")]
    CorruptState(String),

    #[error("Write failed: {0}")]
    WriteFailure(#[from] PersistenceError),
}

/// The intervention termination a transition entails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterventionCompletion {
    pub intervention_id: String,
    pub ended_at: DateTime<Utc>,
}

/// A planned transition: the updated team plus the write intents
///
/// The machine never touches the backend itself; the lifecycle
/// service applies these intents through the persistence adapter.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub team: Team,
    pub created: Option<Intervention>,
    pub completed: Option<InterventionCompletion>,
    pub destination: Option<String>,
}

/// State machine over one team's status
#[derive(Debug, Clone)]
pub struct TeamStateMachine {
    team: Team,
}

impl TeamStateMachine {
    pub fn new(team: Team) -> Self {
        Self { team }
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    /// Guard: a new intervention may begin
    pub fn can_start(&self) -> bool {
        self.team.status.can_start()
    }

    /// Guard: the current intervention may be concluded
    pub fn can_terminate(&self) -> bool {
        self.team.status.can_terminate()
    }

    /// Guard: a transfer may begin
    pub fn can_transfer(&self) -> bool {
        self.team.status.can_transfer()
    }

    /// Apply an action, re-validating the guard regardless of any
    /// `can_*` check the caller made earlier
    pub fn transition(
        &mut self,
        action: LifecycleAction,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, TransitionError> {
        debug!(team = %self.team.name, status = %self.team.status, action = %action.kind(), "transition requested");

        let outcome = match (self.team.status, &action) {
            (TeamStatus::Free, LifecycleAction::StartIntervention) => {
                let mut team = self.team.clone();
                let intervention = Intervention::begin(&team, now);
                team.status = TeamStatus::Active;
                team.active_intervention_id = Some(intervention.id.clone());
                team.last_updated = now;
                TransitionOutcome {
                    team,
                    created: Some(intervention),
                    completed: None,
                    destination: None,
                }
            }

            (TeamStatus::Active | TeamStatus::Transferring, LifecycleAction::Terminate) => {
                let mut team = self.team.clone();
                let intervention_id = team.active_intervention_id.take().ok_or_else(|| {
                    TransitionError::CorruptState(format!(
                        "team {} is {} with no intervention attached",
                        team.name, team.status
                    ))
                })?;
                team.status = TeamStatus::Free;
                team.last_updated = now;
                TransitionOutcome {
                    team,
                    created: None,
                    completed: Some(InterventionCompletion {
                        intervention_id,
                        ended_at: now,
                    }),
                    destination: None,
                }
            }

            (TeamStatus::Active, LifecycleAction::BeginTransfer { destination }) => {
                if destination.is_empty() {
                    return Err(TransitionError::MissingDestination);
                }
                let mut team = self.team.clone();
                team.status = TeamStatus::Transferring;
                team.last_updated = now;
                TransitionOutcome {
                    team,
                    created: None,
                    completed: None,
                    destination: Some(destination.clone()),
                }
            }

            (status, action) => {
                return Err(TransitionError::IllegalTransition {
                    status,
                    action: action.kind(),
                });
            }
        };

        self.team = outcome.team.clone();
        Ok(outcome)
    }
}
