use crate::model::participant::{Participant, ParticipantId, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Authoritative snapshot of the session's participants.
///
/// Ids are unique: when a snapshot repeats an id, the first entry wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Participant>", into = "Vec<Participant>")]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new(participants: Vec<Participant>) -> Self {
        let mut seen = HashSet::with_capacity(participants.len());
        let participants = participants
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        Self { participants }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.participants.iter().filter(|p| p.ready).count()
    }

    /// Remote ids the local participant should hold a link to: everyone
    /// except itself and participants whose role is excluded. A local
    /// participant with an excluded role stays outside the mesh entirely.
    pub fn mesh_members(&self, local: &ParticipantId, excluded: &[Role]) -> BTreeSet<ParticipantId> {
        if let Some(me) = self.get(local) {
            if excluded.contains(&me.role) {
                return BTreeSet::new();
            }
        }

        self.participants
            .iter()
            .filter(|p| &p.id != local && !excluded.contains(&p.role))
            .map(|p| p.id.clone())
            .collect()
    }
}

impl From<Vec<Participant>> for Roster {
    fn from(participants: Vec<Participant>) -> Self {
        Self::new(participants)
    }
}

impl From<Roster> for Vec<Participant> {
    fn from(roster: Roster) -> Self {
        roster.participants
    }
}
