//! FieldOps - field-operations core for volunteer rescue squads
//!
//! Tracks the intervention lifecycle of rescue teams during live
//! events: free → active intervention → transfer → free. Consequential
//! transitions are gated behind a press-and-hold control plus a yes/no
//! confirmation, so nothing fires from a stray touch.
//!
//! # Core Concepts
//!
//! - **Hold to confirm**: a sustained press animates toward completion
//!   while a safety timer backstops it; a per-session latch makes the
//!   completion fire exactly once whichever mechanism wins
//! - **Guarded transitions**: the team state machine re-validates
//!   every action against current backend state and returns illegal
//!   transitions as results, never panics
//! - **Write intents**: the core reads state and plans transitions;
//!   all persistence goes through an injected adapter
//!
//! # Modules
//!
//! - [`hold`] - press-and-hold gesture controllers
//! - [`lifecycle`] - team status state machine and applier service
//! - [`confirm`] - the yes/no gate between hold and transition
//! - [`panel`] - screen-facing binding of the three controls
//! - [`roster`] - events, teams and volunteer assignment
//! - [`persistence`] - the backend adapter trait and docstore impl
//! - [`config`] - configuration types and loading

pub mod cli;
pub mod config;
pub mod confirm;
pub mod domain;
pub mod feedback;
pub mod hold;
pub mod lifecycle;
pub mod panel;
pub mod persistence;
pub mod roster;

// Re-export commonly used types
pub use config::{Config, FeedbackConfig, HoldConfig, StorageConfig};
pub use confirm::{ConfirmError, ConfirmationPrompt, Decision};
pub use domain::{
    Event, EventLevel, HealthPoint, HealthPointStatus, Intervention, InterventionStatus, Team, TeamStatus,
    VolunteerProfile, VolunteerRole,
};
pub use feedback::{FeedbackKind, FeedbackSink, LogFeedback, NullFeedback, RecordingFeedback};
pub use hold::{HoldKind, HoldPhase, HoldSession, HoldTimings, HoldToConfirmController};
pub use lifecycle::{ActionKind, LifecycleAction, LifecycleService, TeamStateMachine, TransitionError, TransitionOutcome};
pub use panel::{ControlStates, InterventionPanel, PanelError};
pub use persistence::{DocstorePersistence, PersistenceAdapter, PersistenceError};
pub use roster::{AvailableVolunteer, EventPatch, EventService, NewEvent, RosterError, TeamService, VolunteerService};
