//! Ephemeral records emitted by fire control.
//!
//! Tracers and muzzle flashes are pure visualization data. Gunfire events
//! additionally drive the sound pass. All three age once per tick and are
//! dropped when `age >= lifetime`.

use serde::{Deserialize, Serialize};

use crate::constants::{GUNFIRE_LIFETIME, MUZZLE_FLASH_LIFETIME, TRACER_LIFETIME};
use crate::enums::{FireMode, OutcomeKind, Team};
use crate::types::{AgentId, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracer {
    pub from: Position,
    pub to: Position,
    pub team: Team,
    pub hit: bool,
    /// Secondary segment of a ricochet.
    pub ricochet: bool,
    pub age: u32,
    pub lifetime: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuzzleFlash {
    pub position: Position,
    pub heading: f64,
    pub team: Team,
    pub age: u32,
    pub lifetime: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GunfireEvent {
    pub shooter: AgentId,
    pub team: Team,
    pub position: Position,
    pub mode: FireMode,
    /// Relative loudness; 1.0 for a single rifle round.
    pub loudness: f64,
    pub tick: u64,
    pub age: u32,
    pub lifetime: u32,
}

/// One resolved round, for the telemetry layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatOutcome {
    pub tick: u64,
    pub shooter: AgentId,
    pub target: AgentId,
    pub kind: OutcomeKind,
}

impl Tracer {
    pub fn new(from: Position, to: Position, team: Team, hit: bool, ricochet: bool) -> Self {
        Self {
            from,
            to,
            team,
            hit,
            ricochet,
            age: 0,
            lifetime: TRACER_LIFETIME,
        }
    }
}

impl MuzzleFlash {
    pub fn new(position: Position, heading: f64, team: Team) -> Self {
        Self {
            position,
            heading,
            team,
            age: 0,
            lifetime: MUZZLE_FLASH_LIFETIME,
        }
    }
}

impl GunfireEvent {
    pub fn new(shooter: AgentId, team: Team, position: Position, mode: FireMode, tick: u64) -> Self {
        let loudness = match mode {
            FireMode::Single => 1.0,
            FireMode::Burst => 1.1,
            FireMode::Auto => 1.2,
        };
        Self {
            shooter,
            team,
            position,
            mode,
            loudness,
            tick,
            age: 0,
            lifetime: GUNFIRE_LIFETIME,
        }
    }
}
