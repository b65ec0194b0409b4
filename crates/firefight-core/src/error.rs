//! Setup-time errors.
//!
//! Degenerate simulation state during a tick is absorbed locally and never
//! surfaces here; only configuration and scenario loading can fail.

use crate::types::{AgentId, Position, SquadId};

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The TOML configuration did not parse.
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// A tuning value is out of range or inconsistent with another.
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    /// A scenario referenced a squad that was never declared.
    #[error("unknown squad: {0}")]
    UnknownSquad(SquadId),

    /// A squad was declared without members.
    #[error("{0} has no members")]
    EmptySquad(SquadId),

    /// The same agent id was spawned twice.
    #[error("duplicate {0}")]
    DuplicateAgent(AgentId),

    /// A spawn point lies outside the map.
    #[error("{agent} spawns out of bounds at ({}, {})", .position.x, .position.y)]
    OutOfBounds { agent: AgentId, position: Position },

    /// A spawn point lies inside a wall or full-height cover.
    #[error("{agent} spawns inside an obstacle at ({}, {})", .position.x, .position.y)]
    InsideObstacle { agent: AgentId, position: Position },
}

pub type Result<T> = std::result::Result<T, SimError>;
