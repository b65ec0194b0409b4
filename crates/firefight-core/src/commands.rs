//! External commands sent to the battle engine.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::types::{Position, SquadId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BattleCommand {
    /// Move from Setup into Active.
    StartBattle,
    Pause,
    Resume,
    /// Give a squad a destination. Members read it as a blackboard signal.
    AssignMoveOrder { squad: SquadId, x: f64, y: f64 },
    /// Withdraw a squad's move order.
    ClearMoveOrder { squad: SquadId },
}

impl BattleCommand {
    pub fn move_order(squad: SquadId, to: Position) -> Self {
        BattleCommand::AssignMoveOrder {
            squad,
            x: to.x,
            y: to.y,
        }
    }
}
