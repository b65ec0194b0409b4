//! Squads: loose coordination above the individual agent.
//!
//! A squad never commands its members directly. It aggregates their state
//! (contact, casualties, stress) and publishes signals that each member's
//! blackboard picks up during perception.

use serde::{Deserialize, Serialize};

use firefight_core::enums::Team;
use firefight_core::types::{AgentId, Position, SquadId};
use firefight_mind::SquadSignals;

/// What a squad needs to know about one member this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberStatus {
    pub alive: bool,
    pub position: Position,
    pub effective_fear: f64,
    pub sees_enemy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Squad {
    pub id: SquadId,
    pub team: Team,
    /// Fixed member order; leadership passes down it.
    pub members: Vec<AgentId>,
    pub leader: Option<AgentId>,
    pub move_order: Option<Position>,
    pub has_contact: bool,
    /// Fraction of members down.
    pub casualty_rate: f64,
    /// Mean effective fear of living members.
    pub stress: f64,
    pub living: usize,
    leader_position: Option<Position>,
}

impl Squad {
    pub fn new(id: SquadId, team: Team, members: Vec<AgentId>) -> Self {
        let leader = members.first().copied();
        let living = members.len();
        Self {
            id,
            team,
            members,
            leader,
            move_order: None,
            has_contact: false,
            casualty_rate: 0.0,
            stress: 0.0,
            living,
            leader_position: None,
        }
    }

    /// Recompute aggregates and promote a new leader if the current one is down.
    ///
    /// `status` returns `None` for an id it cannot resolve; that member
    /// counts as lost.
    pub fn refresh<F>(&mut self, status: F)
    where
        F: Fn(AgentId) -> Option<MemberStatus>,
    {
        let mut living = 0;
        let mut fear_sum = 0.0;
        let mut has_contact = false;
        let mut first_living = None;
        let mut leader_status = None;

        for &id in &self.members {
            let Some(s) = status(id).filter(|s| s.alive) else {
                continue;
            };
            living += 1;
            fear_sum += s.effective_fear;
            has_contact |= s.sees_enemy;
            if first_living.is_none() {
                first_living = Some((id, s.position));
            }
            if Some(id) == self.leader {
                leader_status = Some(s.position);
            }
        }

        match leader_status {
            Some(pos) => self.leader_position = Some(pos),
            None => {
                let previous = self.leader;
                self.leader = first_living.map(|(id, _)| id);
                self.leader_position = first_living.map(|(_, pos)| pos);
                if self.leader != previous {
                    if let Some(new_leader) = self.leader {
                        tracing::debug!(squad = %self.id, leader = %new_leader, "leader promoted");
                    }
                }
            }
        }

        self.living = living;
        self.has_contact = has_contact;
        self.casualty_rate = if self.members.is_empty() {
            0.0
        } else {
            1.0 - living as f64 / self.members.len() as f64
        };
        self.stress = if living == 0 {
            0.0
        } else {
            fear_sum / living as f64
        };
    }

    /// Signals for one member. `slot` is its place among living non-leaders.
    pub fn signals_for(&self, member: AgentId, slot: usize) -> SquadSignals {
        SquadSignals {
            has_contact: self.has_contact,
            move_order: self.move_order,
            leader_position: self.leader_position,
            is_leader: self.leader == Some(member),
            slot,
            casualty_rate: self.casualty_rate,
            stress: self.stress,
        }
    }
}
