//! Hold session state
//!
//! One session per press gesture. The session is never persisted and
//! never shared across gestures; the controller creates it on
//! press-down and drops it on release or completion.

use serde::{Deserialize, Serialize};

/// Which guarded action a hold session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldKind {
    /// Begin a new intervention
    Start,
    /// Conclude the current intervention
    Terminate,
    /// Transfer the patient to a health point
    Transfer,
}

impl std::fmt::Display for HoldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Terminate => write!(f, "terminate"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

/// Session phases
///
/// One explicit enum instead of the press/triggered/animating boolean
/// trio: the only transition that needs guarding is Pressing →
/// Completed, and `try_complete` is the single place it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldPhase {
    /// No gesture in progress
    Idle,
    /// Finger down, progress advancing
    Pressing,
    /// Completion claimed; terminal for this session
    Completed,
    /// Released early; terminal for this session
    Cancelled,
}

/// State for one press gesture
#[derive(Debug)]
pub struct HoldSession {
    kind: HoldKind,
    phase: HoldPhase,
    confirmation_triggered: bool,
}

impl HoldSession {
    pub fn new(kind: HoldKind) -> Self {
        Self {
            kind,
            phase: HoldPhase::Pressing,
            confirmation_triggered: false,
        }
    }

    pub fn kind(&self) -> HoldKind {
        self.kind
    }

    pub fn phase(&self) -> HoldPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, HoldPhase::Pressing)
    }

    /// One-shot completion claim
    ///
    /// The animation finishing and the safety timer firing both call
    /// this; exactly one of them gets `true`. Every later call, from
    /// either side, is told `false`.
    pub fn try_complete(&mut self) -> bool {
        if self.confirmation_triggered || !self.is_active() {
            return false;
        }
        self.confirmation_triggered = true;
        self.phase = HoldPhase::Completed;
        true
    }

    /// Cancel the gesture; returns whether it was still pressing
    pub fn cancel(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.phase = HoldPhase::Cancelled;
        true
    }
}
