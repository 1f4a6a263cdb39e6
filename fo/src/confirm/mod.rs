//! Confirmation gate
//!
//! A yes/no modal between a completed hold and the actual state
//! mutation. One prompt may be open at a time; asking again while one
//! is open is rejected rather than stacking dialogs. A rejection
//! resolves the gate with no domain side effects at all.

use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// The user's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected,
}

/// Errors from the confirmation gate
#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error("A confirmation is already open")]
    AlreadyOpen,

    #[error("No confirmation is open")]
    NotOpen,

    #[error("Confirmation channel closed before a decision arrived")]
    Closed,
}

struct Pending {
    message: String,
    reply: oneshot::Sender<Decision>,
}

/// One-at-a-time yes/no gate
///
/// `ask` is awaited by the flow that needs the answer; `resolve` is
/// called by whatever renders the modal (a screen, the CLI, a test).
#[derive(Default)]
pub struct ConfirmationPrompt {
    pending: Mutex<Option<Pending>>,
}

impl ConfirmationPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the prompt and wait for the decision
    pub async fn ask(&self, message: impl Into<String>) -> Result<Decision, ConfirmError> {
        let message = message.into();
        let receiver = {
            let Ok(mut pending) = self.pending.lock() else {
                return Err(ConfirmError::Closed);
            };
            if pending.is_some() {
                return Err(ConfirmError::AlreadyOpen);
            }
            let (reply, receiver) = oneshot::channel();
            *pending = Some(Pending {
                message: message.clone(),
                reply,
            });
            receiver
        };

        debug!(%message, "confirmation opened");
        receiver.await.map_err(|_| ConfirmError::Closed)
    }

    /// Message of the currently open prompt, if any
    pub fn open_message(&self) -> Option<String> {
        self.pending
            .lock()
            .ok()
            .and_then(|pending| pending.as_ref().map(|p| p.message.clone()))
    }

    /// Deliver the decision for the open prompt
    pub fn resolve(&self, decision: Decision) -> Result<(), ConfirmError> {
        let pending = {
            let Ok(mut guard) = self.pending.lock() else {
                return Err(ConfirmError::Closed);
            };
            guard.take().ok_or(ConfirmError::NotOpen)?
        };

        debug!(?decision, "confirmation resolved");
        // The asker may have gone away; that is its problem, not ours
        let _ = pending.reply.send(decision);
        Ok(())
    }
}
