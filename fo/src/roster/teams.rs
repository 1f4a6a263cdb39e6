//! Team roster management
//!
//! Team names follow the `SAP-NNN` convention; the next free number is
//! reused so deleting SAP-002 makes its name available again.
//! Assignment updates the team's member list and each volunteer's
//! back-reference in a single batch, so the two sides cannot drift.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use docstore::{Filter, Store, WriteBatch};
use tracing::{debug, info, warn};

use crate::domain::{Team, VolunteerProfile};

use super::RosterError;

/// A team joined with its member profiles
#[derive(Debug, Clone)]
pub struct TeamWithMembers {
    pub team: Team,
    pub members: Vec<VolunteerProfile>,
}

/// Roster operations over teams
pub struct TeamService {
    store: Arc<Store>,
}

impl TeamService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Create a team for an event
    ///
    /// With no explicit name the next `SAP-NNN` is generated. Names
    /// must be unique within the event; members, if given, are
    /// assigned immediately.
    pub fn create(
        &self,
        event_id: &str,
        name: Option<String>,
        members: &[String],
        created_by: &str,
    ) -> Result<Team, RosterError> {
        let name = match name {
            Some(name) => name,
            None => self.next_team_name(event_id)?,
        };

        if self
            .list_for_event(event_id)?
            .iter()
            .any(|team| team.name == name)
        {
            return Err(RosterError::DuplicateTeamName { name });
        }

        let team = Team::new(name, event_id, created_by);
        self.store.put(&team)?;
        info!(id = %team.id, name = %team.name, event = %event_id, "team created");

        if members.is_empty() {
            Ok(team)
        } else {
            self.assign_volunteers(&team.id, members)
        }
    }

    pub fn get(&self, team_id: &str) -> Result<Team, RosterError> {
        self.store
            .get::<Team>(team_id)?
            .ok_or_else(|| RosterError::TeamNotFound(team_id.to_string()))
    }

    /// Active teams for an event
    ///
    /// One equality filter on the store; the active flag is applied
    /// client-side.
    pub fn list_for_event(&self, event_id: &str) -> Result<Vec<Team>, RosterError> {
        let mut teams: Vec<Team> = self
            .store
            .list::<Team>(&[Filter::eq("event_id", event_id)])?
            .into_iter()
            .filter(|team| team.active)
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(event = %event_id, count = teams.len(), "listed teams");
        Ok(teams)
    }

    /// Next free `SAP-NNN` name for an event
    pub fn next_team_name(&self, event_id: &str) -> Result<String, RosterError> {
        let used: BTreeSet<u32> = self
            .list_for_event(event_id)?
            .iter()
            .filter_map(|team| team.name.strip_prefix("SAP-"))
            .filter_map(|suffix| suffix.parse().ok())
            .collect();

        let mut next = 1;
        while used.contains(&next) {
            next += 1;
        }
        Ok(format!("SAP-{next:03}"))
    }

    /// Soft-deactivate a team, keeping its history
    pub fn deactivate(&self, team_id: &str) -> Result<Team, RosterError> {
        let mut team = self.get(team_id)?;
        team.active = false;
        team.last_updated = Utc::now();
        self.store.put(&team)?;
        info!(id = %team.id, "team deactivated");
        Ok(team)
    }

    /// Replace a team's member list
    ///
    /// The team document and every touched profile land in one batch:
    /// volunteers dropped from the list are unassigned, volunteers in
    /// the list get their back-references set.
    pub fn assign_volunteers(&self, team_id: &str, volunteer_ids: &[String]) -> Result<Team, RosterError> {
        let mut team = self.get(team_id)?;
        let now = Utc::now();
        let mut batch = WriteBatch::new();

        // Unassign members not in the new list
        for dropped in team.members.iter().filter(|m| !volunteer_ids.contains(m)) {
            if let Some(mut profile) = self.store.get::<VolunteerProfile>(dropped)? {
                profile.assigned_team = None;
                profile.active_event = None;
                profile.last_updated = now;
                batch.put(&profile)?;
            }
        }

        for volunteer_id in volunteer_ids {
            let mut profile = self
                .store
                .get::<VolunteerProfile>(volunteer_id)?
                .ok_or_else(|| RosterError::ProfileNotFound(volunteer_id.clone()))?;
            profile.assigned_team = Some(team.id.clone());
            profile.active_event = Some(team.event_id.clone());
            profile.last_updated = now;
            batch.put(&profile)?;
        }

        team.members = volunteer_ids.to_vec();
        team.last_updated = now;
        batch.put(&team)?;

        self.store.commit(batch)?;
        info!(team = %team.name, count = volunteer_ids.len(), "volunteers assigned");
        Ok(team)
    }

    /// Clear team assignment from the given profiles
    pub fn remove_volunteers(&self, volunteer_ids: &[String]) -> Result<(), RosterError> {
        let now = Utc::now();
        let mut batch = WriteBatch::new();

        for volunteer_id in volunteer_ids {
            let Some(mut profile) = self.store.get::<VolunteerProfile>(volunteer_id)? else {
                warn!(volunteer = %volunteer_id, "skipping unknown profile during removal");
                continue;
            };
            profile.assigned_team = None;
            profile.active_event = None;
            profile.last_updated = now;
            batch.put(&profile)?;
        }

        if !batch.is_empty() {
            self.store.commit(batch)?;
        }
        Ok(())
    }

    /// Delete a team, unassigning its members first
    pub fn delete(&self, team_id: &str) -> Result<(), RosterError> {
        let team = self.get(team_id)?;

        if !team.members.is_empty() {
            self.remove_volunteers(&team.members)?;
        }

        self.store.delete::<Team>(team_id)?;
        info!(id = %team_id, name = %team.name, "team deleted");
        Ok(())
    }

    /// Teams for an event joined with member profiles
    ///
    /// Unreadable member references are skipped with a warning rather
    /// than failing the whole listing.
    pub fn teams_with_members(&self, event_id: &str) -> Result<Vec<TeamWithMembers>, RosterError> {
        let teams = self.list_for_event(event_id)?;
        let mut joined = Vec::with_capacity(teams.len());

        for team in teams {
            let mut members = Vec::with_capacity(team.members.len());
            for member_id in &team.members {
                match self.store.get::<VolunteerProfile>(member_id)? {
                    Some(profile) => members.push(profile),
                    None => warn!(team = %team.name, member = %member_id, "member profile missing"),
                }
            }
            joined.push(TeamWithMembers { team, members });
        }

        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_volunteers(store: &Store, ids: &[&str]) {
        for id in ids {
            store.put(&VolunteerProfile::new(*id)).unwrap();
        }
    }

    #[test]
    fn test_create_generates_sequential_names() {
        let service = TeamService::new(Arc::new(Store::new()));

        let first = service.create("event-1", None, &[], "admin-1").unwrap();
        let second = service.create("event-1", None, &[], "admin-1").unwrap();

        assert_eq!(first.name, "SAP-001");
        assert_eq!(second.name, "SAP-002");
    }

    #[test]
    fn test_next_name_fills_gaps() {
        let store = Arc::new(Store::new());
        let service = TeamService::new(store.clone());

        let first = service.create("event-1", None, &[], "admin-1").unwrap();
        service.create("event-1", None, &[], "admin-1").unwrap();
        service.create("event-1", None, &[], "admin-1").unwrap();

        service.delete(&first.id).unwrap();
        assert_eq!(service.next_team_name("event-1").unwrap(), "SAP-001");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let service = TeamService::new(Arc::new(Store::new()));
        service
            .create("event-1", Some("SAP-001".to_string()), &[], "admin-1")
            .unwrap();

        let err = service
            .create("event-1", Some("SAP-001".to_string()), &[], "admin-1")
            .unwrap_err();
        assert!(matches!(err, RosterError::DuplicateTeamName { .. }));

        // Same name on another event is fine
        assert!(
            service
                .create("event-2", Some("SAP-001".to_string()), &[], "admin-1")
                .is_ok()
        );
    }

    #[test]
    fn test_assign_updates_both_sides() {
        let store = Arc::new(Store::new());
        seeded_volunteers(&store, &["uid-1", "uid-2"]);
        let service = TeamService::new(store.clone());

        let team = service
            .create(
                "event-1",
                None,
                &["uid-1".to_string(), "uid-2".to_string()],
                "admin-1",
            )
            .unwrap();

        assert_eq!(team.members, vec!["uid-1", "uid-2"]);
        for uid in ["uid-1", "uid-2"] {
            let profile: VolunteerProfile = store.get(uid).unwrap().unwrap();
            assert_eq!(profile.assigned_team.as_deref(), Some(team.id.as_str()));
            assert_eq!(profile.active_event.as_deref(), Some("event-1"));
        }
    }

    #[test]
    fn test_reassign_unassigns_dropped_members() {
        let store = Arc::new(Store::new());
        seeded_volunteers(&store, &["uid-1", "uid-2", "uid-3"]);
        let service = TeamService::new(store.clone());

        let team = service
            .create(
                "event-1",
                None,
                &["uid-1".to_string(), "uid-2".to_string()],
                "admin-1",
            )
            .unwrap();

        service
            .assign_volunteers(&team.id, &["uid-2".to_string(), "uid-3".to_string()])
            .unwrap();

        let dropped: VolunteerProfile = store.get("uid-1").unwrap().unwrap();
        assert!(dropped.assigned_team.is_none());
        assert!(dropped.active_event.is_none());

        let kept: VolunteerProfile = store.get("uid-2").unwrap().unwrap();
        assert_eq!(kept.assigned_team.as_deref(), Some(team.id.as_str()));
    }

    #[test]
    fn test_assign_unknown_profile_fails_whole_batch() {
        let store = Arc::new(Store::new());
        seeded_volunteers(&store, &["uid-1"]);
        let service = TeamService::new(store.clone());

        let team = service.create("event-1", None, &[], "admin-1").unwrap();
        let err = service
            .assign_volunteers(&team.id, &["uid-1".to_string(), "ghost".to_string()])
            .unwrap_err();
        assert!(matches!(err, RosterError::ProfileNotFound(_)));

        // Nothing was committed
        let profile: VolunteerProfile = store.get("uid-1").unwrap().unwrap();
        assert!(profile.assigned_team.is_none());
        assert!(service.get(&team.id).unwrap().members.is_empty());
    }

    #[test]
    fn test_delete_unassigns_members() {
        let store = Arc::new(Store::new());
        seeded_volunteers(&store, &["uid-1"]);
        let service = TeamService::new(store.clone());

        let team = service
            .create("event-1", None, &["uid-1".to_string()], "admin-1")
            .unwrap();
        service.delete(&team.id).unwrap();

        assert!(matches!(service.get(&team.id), Err(RosterError::TeamNotFound(_))));
        let profile: VolunteerProfile = store.get("uid-1").unwrap().unwrap();
        assert!(profile.assigned_team.is_none());
    }

    #[test]
    fn test_deactivated_team_hidden_from_listing() {
        let service = TeamService::new(Arc::new(Store::new()));
        let team = service.create("event-1", None, &[], "admin-1").unwrap();

        service.deactivate(&team.id).unwrap();
        assert!(service.list_for_event("event-1").unwrap().is_empty());

        // Its name becomes reusable
        assert_eq!(service.next_team_name("event-1").unwrap(), "SAP-001");
    }

    #[test]
    fn test_teams_with_members_skips_missing_profiles() {
        let store = Arc::new(Store::new());
        seeded_volunteers(&store, &["uid-1"]);
        let service = TeamService::new(store.clone());

        let team = service
            .create("event-1", None, &["uid-1".to_string()], "admin-1")
            .unwrap();

        // Simulate a dangling member reference
        let mut broken = service.get(&team.id).unwrap();
        broken.members.push("ghost".to_string());
        store.put(&broken).unwrap();

        let joined = service.teams_with_members("event-1").unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].members.len(), 1);
        assert_eq!(joined[0].members[0].id, "uid-1");
    }
}
