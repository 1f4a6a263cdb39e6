//! Event management

use std::sync::Arc;

use chrono::Utc;
use docstore::Store;
use tracing::{debug, info};

use crate::domain::{Event, EventLevel};

use super::RosterError;

/// Fields for creating an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub level: Option<EventLevel>,
    pub notes: Option<String>,
    pub created_by: String,
}

/// Partial update for an event
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub level: Option<EventLevel>,
    pub notes: Option<String>,
}

/// CRUD over events
pub struct EventService {
    store: Arc<Store>,
}

impl EventService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn create(&self, new_event: NewEvent) -> Result<Event, RosterError> {
        let mut event = Event::new(new_event.name, new_event.location, new_event.created_by);
        event.date = new_event.date;
        event.start_time = new_event.start_time;
        event.end_time = new_event.end_time;
        event.level = new_event.level;
        event.notes = new_event.notes;

        self.store.put(&event)?;
        info!(id = %event.id, name = %event.name, "event created");
        Ok(event)
    }

    pub fn get(&self, event_id: &str) -> Result<Event, RosterError> {
        self.store
            .get::<Event>(event_id)?
            .ok_or_else(|| RosterError::EventNotFound(event_id.to_string()))
    }

    /// All events, newest first
    pub fn list(&self) -> Result<Vec<Event>, RosterError> {
        let mut events = self.store.list::<Event>(&[])?;
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(count = events.len(), "listed events");
        Ok(events)
    }

    pub fn update(&self, event_id: &str, patch: EventPatch) -> Result<Event, RosterError> {
        let mut event = self.get(event_id)?;

        if let Some(name) = patch.name {
            event.name = name;
        }
        if let Some(location) = patch.location {
            event.location = location;
        }
        if patch.date.is_some() {
            event.date = patch.date;
        }
        if patch.start_time.is_some() {
            event.start_time = patch.start_time;
        }
        if patch.end_time.is_some() {
            event.end_time = patch.end_time;
        }
        if patch.level.is_some() {
            event.level = patch.level;
        }
        if patch.notes.is_some() {
            event.notes = patch.notes;
        }
        event.updated_at = Utc::now();

        self.store.put(&event)?;
        info!(id = %event.id, "event updated");
        Ok(event)
    }

    /// Delete an event; returns whether it existed
    pub fn delete(&self, event_id: &str) -> Result<bool, RosterError> {
        let removed = self.store.delete::<Event>(event_id)?;
        if removed {
            info!(id = %event_id, "event deleted");
        }
        Ok(removed)
    }
}
