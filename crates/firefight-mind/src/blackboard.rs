//! Per-agent working memory.
//!
//! Threat beliefs hold an `AgentId` and last-known values, never a handle to
//! the source. A belief may outlive its source; anything that needs the live
//! agent must look the id up and treat a miss as absence.

use serde::{Deserialize, Serialize};

use firefight_core::constants::*;
use firefight_core::enums::Goal;
use firefight_core::types::{clamp01, AgentId, Position};

use crate::commitment::Commitment;

/// Belief about one enemy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreatFact {
    pub source: AgentId,
    /// Last known position.
    pub position: Position,
    pub confidence: f64,
    pub is_visible: bool,
    pub last_seen_tick: u64,
}

/// A contact currently in view, as reported by perception.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: AgentId,
    pub position: Position,
}

/// Signals a squad exposes to its members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SquadSignals {
    pub has_contact: bool,
    pub move_order: Option<Position>,
    pub leader_position: Option<Position>,
    pub is_leader: bool,
    /// Slot index behind the leader.
    pub slot: usize,
    pub casualty_rate: f64,
    pub stress: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blackboard {
    pub threats: Vec<ThreatFact>,
    pub suppress_level: f64,
    /// Latched when suppression crosses the pin threshold; released below the release level.
    pub pinned: bool,
    /// Rounds aimed at this agent during the current tick.
    pub incoming_fire: u32,
    /// Rounds aimed at this agent during the previous tick.
    pub last_incoming: u32,
    pub commitment: Commitment,
    pub current_goal: Goal,
    pub previous_goal: Goal,
    pub goal_since_tick: u64,
    /// Set when shatter pressure forced this tick's decision; cleared by `begin_tick`.
    pub shattered: bool,
    /// Panic latch held between the enter and recover thresholds.
    pub panicked: bool,
    pub squad: SquadSignals,
    /// Recent shooting success in [-1, 1].
    pub shot_momentum: f64,
    pub hit_streak: u32,
    pub miss_streak: u32,
    pub visible_allies: usize,
    pub isolation_ticks: u32,
    /// Defence fraction of cover between this agent and its nearest threat.
    pub cover_defence: Option<f64>,
    pub local_sightline: f64,
    /// Exponential moving average of pathfinding failures.
    pub path_failure_ema: f64,
    /// Whether a path is being followed.
    pub path_active: bool,
}

impl Blackboard {
    /// Roll per-tick counters. Must run for every agent before any fire resolution.
    pub fn begin_tick(&mut self) {
        self.last_incoming = self.incoming_fire;
        self.incoming_fire = 0;
        self.shattered = false;
    }

    /// Merge this tick's visible contacts into memory.
    ///
    /// Contacts no longer visible are kept as last-known positions with fading
    /// confidence and dropped once stale.
    pub fn update_threats(&mut self, visible: &[Contact], tick: u64) {
        for fact in &mut self.threats {
            fact.is_visible = false;
        }

        for contact in visible {
            match self.threats.iter_mut().find(|f| f.source == contact.id) {
                Some(fact) => {
                    fact.position = contact.position;
                    fact.confidence = 1.0;
                    fact.is_visible = true;
                    fact.last_seen_tick = tick;
                }
                None => self.threats.push(ThreatFact {
                    source: contact.id,
                    position: contact.position,
                    confidence: 1.0,
                    is_visible: true,
                    last_seen_tick: tick,
                }),
            }
        }

        self.threats.retain_mut(|fact| {
            if fact.is_visible {
                return true;
            }
            let age = tick.saturating_sub(fact.last_seen_tick);
            if age > THREAT_STALE_TICKS {
                return false;
            }
            fact.confidence = fact
                .confidence
                .min(1.0 - age as f64 / THREAT_STALE_TICKS as f64);
            true
        });
    }

    /// Record gunfire heard from an enemy. Never downgrades a visible belief.
    pub fn hear_gunfire(&mut self, source: AgentId, position: Position, strength: f64, tick: u64) {
        let strength = clamp01(strength);
        match self.threats.iter_mut().find(|f| f.source == source) {
            Some(fact) if fact.is_visible => {}
            Some(fact) => {
                fact.position = position;
                fact.confidence = fact.confidence.max(strength);
                fact.last_seen_tick = tick;
            }
            None => self.threats.push(ThreatFact {
                source,
                position,
                confidence: strength,
                is_visible: false,
                last_seen_tick: tick,
            }),
        }
    }

    /// Forget everything about one source.
    pub fn forget(&mut self, source: AgentId) {
        self.threats.retain(|f| f.source != source);
    }

    pub fn visible_threats(&self) -> impl Iterator<Item = &ThreatFact> {
        self.threats.iter().filter(|f| f.is_visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_threats().count()
    }

    /// Nearest visible threat to `from`.
    pub fn nearest_visible(&self, from: &Position) -> Option<&ThreatFact> {
        self.visible_threats().min_by(|a, b| {
            from.range_to(&a.position)
                .total_cmp(&from.range_to(&b.position))
                .then(a.source.cmp(&b.source))
        })
    }

    /// Freshest unseen belief, the target of move-to-contact.
    pub fn last_known(&self) -> Option<&ThreatFact> {
        self.threats
            .iter()
            .filter(|f| !f.is_visible)
            .max_by(|a, b| {
                a.last_seen_tick
                    .cmp(&b.last_seen_tick)
                    .then(a.confidence.total_cmp(&b.confidence))
                    .then(b.source.cmp(&a.source))
            })
    }

    /// Best guess at where the enemy is: nearest visible, else freshest memory.
    pub fn threat_focus(&self, from: &Position) -> Option<Position> {
        self.nearest_visible(from)
            .or_else(|| self.last_known())
            .map(|f| f.position)
    }

    /// A round was aimed at this agent.
    pub fn register_incoming(&mut self) {
        self.incoming_fire += 1;
        let weight = if self.current_goal.is_passive() {
            SHATTER_PASSIVE_WEIGHT
        } else {
            1.0
        };
        self.commitment.add_shatter(SHATTER_PER_ROUND * weight);
    }

    /// Accumulate suppression. Returns `true` only on the tick the agent becomes pinned.
    pub fn add_suppression(&mut self, amount: f64) -> bool {
        self.suppress_level = clamp01(self.suppress_level + amount.max(0.0));
        if !self.pinned && self.suppress_level >= PIN_THRESHOLD {
            self.pinned = true;
            self.commitment.add_shatter(SHATTER_ON_PIN);
            return true;
        }
        false
    }

    pub fn decay_suppression(&mut self, dt: f64) {
        self.suppress_level = clamp01(self.suppress_level - SUPPRESS_DECAY * dt.max(0.0));
        if self.pinned && self.suppress_level < PIN_RELEASE {
            self.pinned = false;
        }
    }

    pub fn under_fire(&self) -> bool {
        self.incoming_fire > 0 || self.last_incoming > 0
    }

    /// Apply the outcome of a completed trigger pull to streaks and momentum.
    pub fn record_pull(&mut self, hits: u32) {
        if hits > 0 {
            self.hit_streak += 1;
            self.miss_streak = 0;
            self.shot_momentum = (self.shot_momentum + 0.25).min(1.0);
        } else {
            self.miss_streak += 1;
            self.hit_streak = 0;
            self.shot_momentum = (self.shot_momentum - 0.15).max(-1.0);
        }
    }

    /// Momentum drifts back toward neutral when nobody is shooting.
    pub fn relax_momentum(&mut self, dt: f64) {
        let step = 0.05 * dt.max(0.0);
        if self.shot_momentum > 0.0 {
            self.shot_momentum = (self.shot_momentum - step).max(0.0);
        } else {
            self.shot_momentum = (self.shot_momentum + step).min(0.0);
        }
    }

    /// Track a pathfinding attempt in the failure EMA.
    pub fn record_path_attempt(&mut self, success: bool) {
        self.path_failure_ema = if success {
            self.path_failure_ema * 0.8
        } else {
            self.path_failure_ema * 0.8 + 0.2
        };
        self.path_active = success;
    }
}
