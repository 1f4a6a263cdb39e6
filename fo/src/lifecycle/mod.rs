//! Team intervention lifecycle
//!
//! The pure transition table lives in [`machine`]; the async applier
//! that issues persistence writes lives in [`service`].

mod machine;
mod service;

pub use machine::{
    ActionKind, InterventionCompletion, LifecycleAction, TeamStateMachine, TransitionError, TransitionOutcome,
};
pub use service::LifecycleService;
