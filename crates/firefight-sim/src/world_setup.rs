//! Entity spawn factories.

use hecs::{Entity, World};

use firefight_core::components::*;
use firefight_core::enums::Team;
use firefight_core::types::{Position, SquadId};
use firefight_mind::profiles::get_profile;
use firefight_mind::{Blackboard, PsychState};

use crate::scenario::AgentSpec;

/// Spawn one soldier with the full agent component bundle.
pub fn spawn_agent(world: &mut World, spec: &AgentSpec, team: Team, squad: SquadId) -> Entity {
    let profile = spec.profile.unwrap_or_else(|| get_profile(spec.archetype));
    let soldier = Soldier {
        id: spec.id,
        team,
        squad,
        archetype: spec.archetype,
        profile,
        objective: spec.objective,
        origin: spec.position,
    };
    let kinematics = Kinematics {
        heading: spec.position.bearing_to(&spec.objective),
        ..Default::default()
    };

    world.spawn((
        soldier,
        spec.position,
        kinematics,
        Health::default(),
        Weapon::default(),
        Navigation::default(),
        Senses::default(),
        PsychState::from_profile(&profile),
        Blackboard::default(),
    ))
}

/// Read an agent's position, if the entity still exists.
pub fn position_of(world: &World, entity: Entity) -> Option<Position> {
    world.get::<&Position>(entity).ok().map(|p| *p)
}
