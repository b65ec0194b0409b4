//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// The two opposing forces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Blue,
    Red,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }
}

/// Overall battle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Nothing loaded yet.
    #[default]
    Setup,
    /// Ticks advance.
    Active,
    /// Frozen by command.
    Paused,
    /// One side has no living agents left.
    Finished,
}

/// Closed set of tactical goals an agent can pursue.
///
/// Declaration order is also the tie-break order during utility arbitration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Goal {
    #[default]
    Advance,
    MaintainFormation,
    HoldPosition,
    Survive,
    Engage,
    MoveToContact,
    Fallback,
    Flank,
    Overwatch,
    Regroup,
    Peek,
}

impl Goal {
    pub const ALL: [Goal; 11] = [
        Goal::Advance,
        Goal::MaintainFormation,
        Goal::HoldPosition,
        Goal::Survive,
        Goal::Engage,
        Goal::MoveToContact,
        Goal::Fallback,
        Goal::Flank,
        Goal::Overwatch,
        Goal::Regroup,
        Goal::Peek,
    ];

    /// Goals that sit still and wait. Incoming fire shatters them faster.
    pub fn is_passive(self) -> bool {
        matches!(
            self,
            Goal::HoldPosition | Goal::Overwatch | Goal::MaintainFormation | Goal::Peek
        )
    }

    /// Whether an agent pursuing this goal will pull the trigger on a visible enemy.
    pub fn permits_fire(self) -> bool {
        !matches!(self, Goal::Survive | Goal::Fallback | Goal::Regroup)
    }

    /// Whether this goal needs an active path to make progress.
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            Goal::Advance
                | Goal::MaintainFormation
                | Goal::MoveToContact
                | Goal::Fallback
                | Goal::Flank
                | Goal::Regroup
        )
    }
}

/// Weapon fire mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireMode {
    #[default]
    Single,
    Burst,
    Auto,
}

/// Body posture. Affects spread, exposed silhouette, and speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    Standing,
    Crouching,
    Prone,
}

/// Preset soldier archetypes used by scenario setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoldierArchetype {
    #[default]
    Rifleman,
    Recruit,
    Veteran,
    Marksman,
    Gunner,
}

/// Life state of an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vitality {
    #[default]
    Alive,
    /// Terminal. The agent is never mutated again.
    Incapacitated { tick: u64 },
}

/// Kind of a per-shot combat outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutcomeKind {
    Hit { damage: f64 },
    Miss,
    Kill,
    Ricochet,
}
