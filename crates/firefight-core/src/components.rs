//! ECS components for hecs entities.
//!
//! Components are plain data. Game logic lives in systems and in
//! `firefight-mind`, whose `PsychState` and `Blackboard` are also attached
//! to every agent entity.

use serde::{Deserialize, Serialize};

use crate::constants::{MAGAZINE_SIZE, MAX_HEALTH, SIGHT_RANGE};
use crate::enums::*;
use crate::types::{AgentId, Position, SquadId};

/// Static skills and traits of a soldier, all in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoldierProfile {
    /// Appetite for closing and shooting.
    pub aggression: f64,
    /// Resistance to morale loss and willingness to aim deliberately.
    pub discipline: f64,
    /// Shooting skill. Tightens spread.
    pub marksmanship: f64,
    /// Dampens fear.
    pub composure: f64,
    /// Dampens fear, accumulated over past battles.
    pub experience: f64,
    /// Hearing and reading the field.
    pub fieldcraft: f64,
}

impl Default for SoldierProfile {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            discipline: 0.5,
            marksmanship: 0.5,
            composure: 0.5,
            experience: 0.3,
            fieldcraft: 0.5,
        }
    }
}

/// Identity and standing orders of an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Soldier {
    pub id: AgentId,
    pub team: Team,
    pub squad: SquadId,
    pub archetype: SoldierArchetype,
    pub profile: SoldierProfile,
    /// Where the agent is trying to get to when nothing else matters.
    pub objective: Position,
    /// Spawn point, used as the fallback direction.
    pub origin: Position,
}

/// Facing, posture, and whether the agent moved this tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Kinematics {
    /// Facing in radians (0 = +x).
    pub heading: f64,
    pub stance: Stance,
    pub moving: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub hp: f64,
    pub max: f64,
    pub vitality: Vitality,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            hp: MAX_HEALTH,
            max: MAX_HEALTH,
            vitality: Vitality::Alive,
        }
    }
}

impl Health {
    pub fn is_alive(&self) -> bool {
        self.vitality == Vitality::Alive
    }

    /// Remaining health as a fraction of max.
    pub fn fraction(&self) -> f64 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.hp / self.max).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Senses {
    pub sight_range: f64,
    /// Ticks of blindness left (flash, smoke, dust).
    pub blinded_ticks: u32,
}

impl Default for Senses {
    fn default() -> Self {
        Self {
            sight_range: SIGHT_RANGE,
            blinded_ticks: 0,
        }
    }
}

/// Active and requested fire mode. A change blocks firing until `switch_ticks` runs out.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FireModeState {
    pub current: FireMode,
    pub desired: FireMode,
    pub switch_ticks: u32,
}

/// Trigger state of a weapon.
///
/// A multi-round pull fires its first round immediately and queues the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum TriggerPull {
    #[default]
    Idle,
    Queued {
        target: AgentId,
        mode: FireMode,
        /// Rounds still to fire.
        remaining: u32,
        /// Rounds already fired in this pull.
        fired: u32,
        /// Rounds of this pull that hit.
        hits: u32,
        next_round_tick: u64,
        /// Spread of the first round; later rounds add climb on top.
        spread_baseline: f64,
    },
}

/// Long-range deliberate aim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum AimState {
    #[default]
    Idle,
    Aiming { target: AgentId, ticks: u32 },
}

/// Weapon-cycle state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weapon {
    pub fire_mode: FireModeState,
    pub trigger: TriggerPull,
    pub aim: AimState,
    pub cooldown_ticks: u32,
    pub magazine: u32,
    pub reload_ticks: u32,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            fire_mode: FireModeState::default(),
            trigger: TriggerPull::Idle,
            aim: AimState::Idle,
            cooldown_ticks: 0,
            magazine: MAGAZINE_SIZE,
            reload_ticks: 0,
        }
    }
}

/// Current movement plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Navigation {
    /// Destination the current path leads to.
    pub destination: Option<Position>,
    /// Remaining waypoints, next first.
    pub path: Vec<Position>,
    /// Peek toggle: out of cover on odd phases.
    pub peek_out: bool,
}
