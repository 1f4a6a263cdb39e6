//! Feedback sink
//!
//! Haptic/audio feedback is a platform concern; the core only emits
//! pulse intents. Pulses are fire-and-forget and must never block.

use std::sync::Mutex;

use tracing::debug;

/// Kinds of feedback pulse the core emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    /// Press-and-hold began
    Started,
    /// Hold released before completion
    Cancelled,
    /// Transition applied
    Success,
    /// Guard rejected an action
    Warning,
    /// Persistence write failed
    Error,
}

impl std::fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Destination for feedback pulses
pub trait FeedbackSink: Send + Sync {
    fn pulse(&self, kind: FeedbackKind);
}

/// Discards all pulses
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn pulse(&self, _kind: FeedbackKind) {}
}

/// Logs pulses at debug level; the CLI's sink
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn pulse(&self, kind: FeedbackKind) {
        debug!(%kind, "feedback pulse");
    }
}

/// Records pulses for assertions in tests
#[derive(Default)]
pub struct RecordingFeedback {
    pulses: Mutex<Vec<FeedbackKind>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<FeedbackKind> {
        self.pulses.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn count_of(&self, kind: FeedbackKind) -> usize {
        self.recorded().iter().filter(|k| **k == kind).count()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn pulse(&self, kind: FeedbackKind) {
        if let Ok(mut pulses) = self.pulses.lock() {
            pulses.push(kind);
        }
    }
}
