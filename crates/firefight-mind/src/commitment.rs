//! Commitment scheduling: how long a goal is held before it may be reconsidered.
//!
//! A goal change enters COMMIT, a fixed hold. COMMIT rolls into SUSTAIN, a hold
//! that can be re-armed when the goal is reinforced. SUSTAIN rolls into REVIEW,
//! where the selector is allowed to look again. Shatter pressure, fed by
//! incoming fire, short-circuits all of it.

use serde::{Deserialize, Serialize};

use firefight_core::config::DecisionTuning;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitPhase {
    Commit,
    Sustain,
    /// Open for re-evaluation. Fresh agents start here.
    #[default]
    Review,
}

/// What the gate allows this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalGate {
    /// Keep the current goal without looking.
    Hold,
    /// Check reinforcement, then re-evaluate if it fails.
    Review,
    /// Forced re-evaluation; shatter pressure has been consumed.
    Shattered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    pub phase: CommitPhase,
    pub phase_start_tick: u64,
    pub shatter_pressure: f64,
}

impl Commitment {
    /// Enter COMMIT after a goal change.
    pub fn commit(&mut self, tick: u64) {
        self.phase = CommitPhase::Commit;
        self.phase_start_tick = tick;
    }

    /// Re-arm SUSTAIN without changing goal.
    pub fn sustain(&mut self, tick: u64) {
        self.phase = CommitPhase::Sustain;
        self.phase_start_tick = tick;
    }

    pub fn add_shatter(&mut self, amount: f64) {
        self.shatter_pressure = (self.shatter_pressure + amount.max(0.0)).max(0.0);
    }

    /// Advance the phase clock and report what the selector may do.
    pub fn gate(&mut self, tick: u64, tuning: &DecisionTuning) -> EvalGate {
        if self.shatter_pressure >= tuning.shatter_threshold {
            self.shatter_pressure = 0.0;
            return EvalGate::Shattered;
        }

        let elapsed = tick.saturating_sub(self.phase_start_tick);
        match self.phase {
            CommitPhase::Commit if elapsed >= tuning.commit_ticks => {
                self.sustain(tick);
                if tuning.sustain_ticks == 0 {
                    self.phase = CommitPhase::Review;
                    return EvalGate::Review;
                }
                EvalGate::Hold
            }
            CommitPhase::Sustain if elapsed >= tuning.sustain_ticks => {
                self.phase = CommitPhase::Review;
                self.phase_start_tick = tick;
                EvalGate::Review
            }
            CommitPhase::Review => EvalGate::Review,
            _ => EvalGate::Hold,
        }
    }
}
