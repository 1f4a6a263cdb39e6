//! Hold-to-confirm gesture handling
//!
//! One [`HoldToConfirmController`] per guarded action; each press
//! creates an ephemeral [`HoldSession`] whose latch resolves the
//! animation-vs-safety-timer race to exactly one completion.

mod controller;
mod session;

pub use controller::{HoldTimings, HoldToConfirmController};
pub use session::{HoldKind, HoldPhase, HoldSession};
