//! Volunteer queries

use std::sync::Arc;

use docstore::{Filter, Store};
use tracing::debug;

use crate::domain::{Team, VolunteerProfile};

use super::RosterError;

/// A volunteer with assignment context, for selection screens
#[derive(Debug, Clone)]
pub struct AvailableVolunteer {
    pub profile: VolunteerProfile,
    pub is_assigned: bool,
    pub current_team_name: Option<String>,
}

/// Read-side operations over volunteer profiles
pub struct VolunteerService {
    store: Arc<Store>,
}

impl VolunteerService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn get(&self, volunteer_id: &str) -> Result<VolunteerProfile, RosterError> {
        self.store
            .get::<VolunteerProfile>(volunteer_id)?
            .ok_or_else(|| RosterError::ProfileNotFound(volunteer_id.to_string()))
    }

    /// Register or replace a profile
    pub fn upsert(&self, profile: &VolunteerProfile) -> Result<(), RosterError> {
        self.store.put(profile)?;
        Ok(())
    }

    pub fn list_all(&self) -> Result<Vec<VolunteerProfile>, RosterError> {
        let mut profiles = self.store.list::<VolunteerProfile>(&[])?;
        profiles.sort_by(|a, b| a.full_name().cmp(&b.full_name()));
        Ok(profiles)
    }

    /// Active volunteers with their assignment state resolved
    ///
    /// One filtered query for the profiles; team names are joined
    /// per-profile afterwards.
    pub fn available(&self) -> Result<Vec<AvailableVolunteer>, RosterError> {
        let profiles = self.store.list::<VolunteerProfile>(&[Filter::eq("active", true)])?;
        let mut volunteers = Vec::with_capacity(profiles.len());

        for profile in profiles {
            let current_team_name = match profile.assigned_team.as_deref() {
                Some(team_id) => self.store.get::<Team>(team_id)?.map(|team| team.name),
                None => None,
            };
            volunteers.push(AvailableVolunteer {
                is_assigned: profile.is_assigned(),
                current_team_name,
                profile,
            });
        }

        volunteers.sort_by(|a, b| a.profile.full_name().cmp(&b.profile.full_name()));
        debug!(count = volunteers.len(), "listed available volunteers");
        Ok(volunteers)
    }

    /// Whether a volunteer belongs to the given team
    pub fn is_member(&self, volunteer_id: &str, team_id: &str) -> Result<bool, RosterError> {
        let Some(team) = self.store.get::<Team>(team_id)? else {
            return Ok(false);
        };
        Ok(team.members.iter().any(|m| m == volunteer_id))
    }
}
