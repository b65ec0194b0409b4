//! Scenario definitions: the map plus the squads that fight on it.
//!
//! Two built-in scenarios ship with the engine: a one-on-one duel used by
//! tests and a small squad skirmish through a few buildings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use firefight_core::components::SoldierProfile;
use firefight_core::enums::{SoldierArchetype, Team};
use firefight_core::error::{Result, SimError};
use firefight_core::types::{AgentId, Position, SquadId};
use firefight_terrain::{Aabb, BattleMap, CoverKind, CoverObject};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: AgentId,
    pub archetype: SoldierArchetype,
    pub position: Position,
    pub objective: Position,
    /// Overrides the archetype's profile.
    #[serde(default)]
    pub profile: Option<SoldierProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadSpec {
    pub id: SquadId,
    pub team: Team,
    /// In leadership order.
    pub members: Vec<AgentSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub map: BattleMap,
    pub squads: Vec<SquadSpec>,
}

impl AgentSpec {
    pub fn new(id: u32, archetype: SoldierArchetype, position: Position, objective: Position) -> Self {
        Self {
            id: AgentId(id),
            archetype,
            position,
            objective,
            profile: None,
        }
    }
}

impl Scenario {
    /// Reject scenarios the engine cannot run.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for squad in &self.squads {
            if squad.members.is_empty() {
                return Err(SimError::EmptySquad(squad.id));
            }
            for agent in &squad.members {
                if !seen.insert(agent.id) {
                    return Err(SimError::DuplicateAgent(agent.id));
                }
                if !self.map.in_bounds(&agent.position) {
                    return Err(SimError::OutOfBounds {
                        agent: agent.id,
                        position: agent.position,
                    });
                }
                if self.map.is_solid(&agent.position) {
                    return Err(SimError::InsideObstacle {
                        agent: agent.id,
                        position: agent.position,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn agent_count(&self) -> usize {
        self.squads.iter().map(|s| s.members.len()).sum()
    }

    /// Two riflemen facing each other across open ground.
    pub fn duel(distance: f64) -> Self {
        let blue = Position::new(200.0, 200.0);
        let red = Position::new(200.0 + distance, 200.0);
        Scenario {
            name: "duel".to_string(),
            map: BattleMap::new(400.0 + distance, 400.0),
            squads: vec![
                SquadSpec {
                    id: SquadId(0),
                    team: Team::Blue,
                    members: vec![AgentSpec::new(1, SoldierArchetype::Rifleman, blue, red)],
                },
                SquadSpec {
                    id: SquadId(1),
                    team: Team::Red,
                    members: vec![AgentSpec::new(2, SoldierArchetype::Rifleman, red, blue)],
                },
            ],
        }
    }

    /// Two four-man squads advancing on each other through a village street.
    pub fn squad_skirmish() -> Self {
        let map = BattleMap::new(1200.0, 800.0)
            .with_wall(Aabb::from_rect(480.0, 120.0, 80.0, 160.0))
            .with_wall(Aabb::from_rect(640.0, 500.0, 100.0, 120.0))
            .with_cover(CoverObject::new(
                Aabb::from_rect(380.0, 360.0, 8.0, 60.0),
                CoverKind::ChestWall,
            ))
            .with_cover(CoverObject::new(
                Aabb::from_rect(820.0, 380.0, 8.0, 60.0),
                CoverKind::ChestWall,
            ))
            .with_cover(CoverObject::new(
                Aabb::from_rect(590.0, 380.0, 30.0, 30.0),
                CoverKind::Rubble,
            ))
            .with_cover(CoverObject::new(
                Aabb::from_rect(600.0, 300.0, 6.0, 50.0),
                CoverKind::TallWall,
            ));

        let blue_goal = Position::new(1050.0, 400.0);
        let red_goal = Position::new(150.0, 400.0);
        let blue = SquadSpec {
            id: SquadId(0),
            team: Team::Blue,
            members: vec![
                AgentSpec::new(1, SoldierArchetype::Veteran, Position::new(150.0, 380.0), blue_goal),
                AgentSpec::new(2, SoldierArchetype::Rifleman, Position::new(130.0, 340.0), blue_goal),
                AgentSpec::new(3, SoldierArchetype::Rifleman, Position::new(130.0, 420.0), blue_goal),
                AgentSpec::new(4, SoldierArchetype::Gunner, Position::new(110.0, 380.0), blue_goal),
            ],
        };
        let red = SquadSpec {
            id: SquadId(1),
            team: Team::Red,
            members: vec![
                AgentSpec::new(11, SoldierArchetype::Rifleman, Position::new(1050.0, 420.0), red_goal),
                AgentSpec::new(12, SoldierArchetype::Recruit, Position::new(1070.0, 380.0), red_goal),
                AgentSpec::new(13, SoldierArchetype::Recruit, Position::new(1070.0, 460.0), red_goal),
                AgentSpec::new(14, SoldierArchetype::Marksman, Position::new(1100.0, 420.0), red_goal),
            ],
        };

        Scenario {
            name: "squad_skirmish".to_string(),
            map,
            squads: vec![blue, red],
        }
    }
}
