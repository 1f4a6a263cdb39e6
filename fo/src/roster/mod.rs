//! Roster management: events, teams and volunteer assignment
//!
//! Thin services over the document store. Queries keep to a single
//! equality filter and do the rest client-side, the way the hosted
//! backend is cheapest to use; roster mutations that touch several
//! documents go through one write batch.

mod events;
mod teams;
mod volunteers;

use thiserror::Error;

pub use events::{EventPatch, EventService, NewEvent};
pub use teams::{TeamService, TeamWithMembers};
pub use volunteers::{AvailableVolunteer, VolunteerService};

/// Errors from roster operations
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Team {name} already exists for this event")]
    DuplicateTeamName { name: String },

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Volunteer profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] docstore::StoreError),
}
