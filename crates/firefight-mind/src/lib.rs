//! Agent cognition for FIREFIGHT.
//!
//! Psychological model, blackboard working memory, commitment scheduling,
//! and utility-based goal selection. No ECS dependency; operates on plain data.

pub mod blackboard;
pub mod commitment;
pub mod goals;
pub mod profiles;
pub mod psych;

pub use firefight_core as core;

pub use blackboard::{Blackboard, Contact, SquadSignals, ThreatFact};
pub use goals::{decide, DecisionContext, DecisionReason, GoalDecision};
pub use psych::{MoraleContext, PsychState};

#[cfg(test)]
mod tests;
