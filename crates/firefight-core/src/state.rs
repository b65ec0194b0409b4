//! Battle snapshot: the complete observable state handed to rendering and
//! telemetry layers after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{CombatOutcome, MuzzleFlash, Tracer};
use crate::types::{AgentId, Position, SimTime, SquadId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub time: SimTime,
    pub phase: BattlePhase,
    pub agents: Vec<AgentView>,
    pub squads: Vec<SquadView>,
    pub tracers: Vec<Tracer>,
    pub muzzle_flashes: Vec<MuzzleFlash>,
    /// Rounds resolved during this tick.
    pub outcomes: Vec<CombatOutcome>,
    pub score: ScoreView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub team: Team,
    pub squad: SquadId,
    pub position: Position,
    pub heading: f64,
    pub stance: Stance,
    pub health: f64,
    pub alive: bool,
    pub goal: Goal,
    pub fire_mode: FireMode,
    pub fear: f64,
    pub effective_fear: f64,
    pub morale: f64,
    pub suppression: f64,
    pub pinned: bool,
    pub panicked: bool,
    /// Known threats, visible or remembered.
    pub known_threats: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadView {
    pub id: SquadId,
    pub team: Team,
    pub leader: Option<AgentId>,
    pub living: usize,
    pub has_contact: bool,
    pub move_order: Option<Position>,
    pub casualty_rate: f64,
    pub stress: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub blue_alive: usize,
    pub red_alive: usize,
    pub rounds_fired: u32,
    pub hits: u32,
    pub kills: u32,
    pub ricochets: u32,
    pub winner: Option<Team>,
}
