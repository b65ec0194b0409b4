//! Stable agent ids mapped to ECS entities.
//!
//! Iteration is always in ascending `AgentId` order, which fixes the order
//! in which agents act within a pass.

use std::collections::BTreeMap;

use hecs::Entity;

use firefight_core::error::{Result, SimError};
use firefight_core::types::AgentId;

#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: BTreeMap<AgentId, Entity>,
}

impl Roster {
    pub fn insert(&mut self, id: AgentId, entity: Entity) -> Result<()> {
        if self.entries.contains_key(&id) {
            return Err(SimError::DuplicateAgent(id));
        }
        self.entries.insert(id, entity);
        Ok(())
    }

    /// Entity of an agent, dead or alive.
    pub fn entity(&self, id: AgentId) -> Option<Entity> {
        self.entries.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, Entity)> + '_ {
        self.entries.iter().map(|(id, e)| (*id, *e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
