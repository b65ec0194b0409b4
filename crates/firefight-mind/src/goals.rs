//! Goal selection: utility arbitration with hysteresis and staged commitment.
//!
//! Pure functions over plain data. The caller assembles a [`DecisionContext`]
//! from perception and hands in the agent's blackboard; the selector mutates
//! only the blackboard's goal and commitment fields.

use firefight_core::config::DecisionTuning;
use firefight_core::constants::{ISOLATION_TICKS, MAX_FIRE_RANGE, REGROUP_DISTANCE};
use firefight_core::enums::Goal;

use crate::blackboard::Blackboard;
use crate::commitment::EvalGate;

/// Situation of one agent at decision time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecisionContext {
    pub tick: u64,
    pub effective_fear: f64,
    pub morale: f64,
    pub health_fraction: f64,
    pub aggression: f64,
    pub discipline: f64,
    pub visible_threats: usize,
    /// Distance to the nearest visible threat.
    pub nearest_threat_distance: Option<f64>,
    /// Some unseen belief is still held.
    pub has_last_known: bool,
    /// Distance to the squad leader; `None` for the leader or a leaderless squad.
    pub leader_distance: Option<f64>,
    /// Distance still to cover toward the objective.
    pub objective_distance: f64,
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// Commitment hold; nothing was looked at.
    Held,
    /// The current goal's continuation conditions still hold.
    Reinforced,
    /// Full evaluation kept the current goal.
    Retained,
    /// Full evaluation switched goal.
    Switched,
    /// Shatter pressure forced the evaluation; reported even when the goal is kept.
    Shattered,
    /// Fear crossed the panic threshold.
    PanicEntered,
    /// Panic latch still held.
    PanicLocked,
    /// Nothing qualified; fell back to Advance.
    Defaulted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalDecision {
    pub goal: Goal,
    pub changed: bool,
    pub reason: DecisionReason,
}

/// Run one decision step for an agent.
pub fn decide(bb: &mut Blackboard, ctx: &DecisionContext, tuning: &DecisionTuning) -> GoalDecision {
    // Panic override with asymmetric hysteresis.
    if bb.panicked {
        if ctx.effective_fear >= tuning.panic_recover {
            return keep(bb, DecisionReason::PanicLocked);
        }
        bb.panicked = false;
        return evaluate(bb, ctx, tuning, DecisionReason::Switched);
    }
    if ctx.effective_fear >= tuning.panic_enter {
        bb.panicked = true;
        let changed = bb.current_goal != Goal::Survive;
        if changed {
            switch_to(bb, Goal::Survive, ctx.tick);
        }
        return GoalDecision {
            goal: Goal::Survive,
            changed,
            reason: DecisionReason::PanicEntered,
        };
    }

    match bb.commitment.gate(ctx.tick, tuning) {
        EvalGate::Hold => keep(bb, DecisionReason::Held),
        EvalGate::Shattered => {
            bb.shattered = true;
            GoalDecision {
                reason: DecisionReason::Shattered,
                ..evaluate(bb, ctx, tuning, DecisionReason::Shattered)
            }
        }
        EvalGate::Review => {
            if reinforces(bb.current_goal, bb, ctx) {
                bb.commitment.sustain(ctx.tick);
                keep(bb, DecisionReason::Reinforced)
            } else {
                evaluate(bb, ctx, tuning, DecisionReason::Switched)
            }
        }
    }
}

fn keep(bb: &Blackboard, reason: DecisionReason) -> GoalDecision {
    GoalDecision {
        goal: bb.current_goal,
        changed: false,
        reason,
    }
}

fn switch_to(bb: &mut Blackboard, goal: Goal, tick: u64) {
    bb.previous_goal = bb.current_goal;
    bb.current_goal = goal;
    bb.goal_since_tick = tick;
    bb.commitment.commit(tick);
}

/// Full utility evaluation. `switch_reason` labels a change.
fn evaluate(
    bb: &mut Blackboard,
    ctx: &DecisionContext,
    tuning: &DecisionTuning,
    switch_reason: DecisionReason,
) -> GoalDecision {
    let scores = score_goals(bb, ctx);
    let current = bb.current_goal;

    let mut best = Goal::Advance;
    let mut best_score = f64::NEG_INFINITY;
    for (goal, score) in scores {
        if score > best_score {
            best = goal;
            best_score = score;
        }
    }

    if best_score <= 0.0 {
        if current == Goal::Advance {
            bb.commitment.sustain(ctx.tick);
            return keep(bb, DecisionReason::Defaulted);
        }
        switch_to(bb, Goal::Advance, ctx.tick);
        return GoalDecision {
            goal: Goal::Advance,
            changed: true,
            reason: DecisionReason::Defaulted,
        };
    }

    let current_score = utility_of(&scores, current);
    if best == current || best_score < current_score + tuning.hysteresis_margin {
        bb.commitment.sustain(ctx.tick);
        return keep(bb, DecisionReason::Retained);
    }

    switch_to(bb, best, ctx.tick);
    GoalDecision {
        goal: best,
        changed: true,
        reason: switch_reason,
    }
}

fn utility_of(scores: &[(Goal, f64); 11], goal: Goal) -> f64 {
    scores
        .iter()
        .find(|(g, _)| *g == goal)
        .map(|(_, s)| *s)
        .unwrap_or(0.0)
}

/// Whether the current goal's continuation conditions still hold.
pub fn reinforces(goal: Goal, bb: &Blackboard, ctx: &DecisionContext) -> bool {
    let in_cover = bb.cover_defence.is_some();
    let under_fire = bb.under_fire();
    match goal {
        Goal::Engage => ctx.visible_threats > 0 && bb.shot_momentum > 0.0 && in_cover,
        Goal::MoveToContact => !under_fire && bb.path_active,
        Goal::Advance => !under_fire && ctx.visible_threats == 0 && bb.path_active,
        Goal::HoldPosition => in_cover && !under_fire,
        Goal::Overwatch => in_cover && ctx.visible_threats == 0 && ctx.has_last_known,
        Goal::MaintainFormation => bb.squad.move_order.is_some() && !bb.squad.has_contact,
        Goal::Fallback => under_fire || ctx.effective_fear > 0.4,
        Goal::Regroup => ctx.leader_distance.is_some_and(|d| d > REGROUP_DISTANCE * 0.5),
        Goal::Survive => ctx.effective_fear > 0.4,
        Goal::Flank => bb.path_active && !bb.pinned && ctx.visible_threats > 0,
        Goal::Peek => false,
    }
}

/// Utility of every goal in declaration order.
pub fn score_goals(bb: &Blackboard, ctx: &DecisionContext) -> [(Goal, f64); 11] {
    Goal::ALL.map(|goal| (goal, utility(goal, bb, ctx)))
}

fn utility(goal: Goal, bb: &Blackboard, ctx: &DecisionContext) -> f64 {
    let fear = ctx.effective_fear;
    let in_cover = bb.cover_defence.is_some();
    let visible = ctx.visible_threats > 0;
    let in_range = ctx
        .nearest_threat_distance
        .is_some_and(|d| d <= MAX_FIRE_RANGE);
    let knows_enemy = ctx.has_last_known || bb.squad.has_contact;
    let isolation = (bb.isolation_ticks as f64 / ISOLATION_TICKS as f64).min(1.0);
    let path_penalty = if goal.is_movement() {
        bb.path_failure_ema * 0.3
    } else {
        0.0
    };

    let raw = match goal {
        Goal::Advance => {
            if visible {
                0.1
            } else if ctx.objective_distance > 1.0 {
                0.3 + 0.2 * ctx.morale - 0.3 * fear
            } else {
                0.05
            }
        }
        Goal::MaintainFormation => match (bb.squad.move_order, ctx.leader_distance) {
            (Some(_), _) if !visible && !bb.squad.has_contact => 0.5 + 0.2 * ctx.discipline,
            (_, Some(d)) if !visible => 0.2 + 0.3 * (d / 150.0).min(1.0),
            _ => 0.0,
        },
        Goal::HoldPosition => {
            if bb.pinned {
                0.5
            } else if in_cover && !visible && knows_enemy {
                0.4
            } else {
                0.0
            }
        }
        Goal::Survive => 0.9 * fear + 0.3 * (1.0 - ctx.health_fraction) + 0.2 * bb.suppress_level,
        Goal::Engage => {
            if visible && in_range {
                let mut u = 0.55 + 0.2 * ctx.aggression + 0.15 * bb.shot_momentum
                    - 0.3 * fear
                    - 0.2 * bb.suppress_level;
                if in_cover {
                    u += 0.1;
                }
                u
            } else {
                0.0
            }
        }
        Goal::MoveToContact => {
            if !visible && knows_enemy {
                0.45 + 0.2 * ctx.aggression - 0.3 * fear
            } else {
                0.0
            }
        }
        Goal::Fallback => {
            if visible && (fear > 0.5 || ctx.health_fraction < 0.35) {
                let mut u = 0.2 + 0.5 * fear + 0.4 * (1.0 - ctx.health_fraction) - 0.2 * ctx.morale;
                if ctx.visible_threats > bb.visible_allies + 1 {
                    u += 0.1;
                }
                u
            } else {
                0.0
            }
        }
        Goal::Flank => {
            if visible && !bb.pinned && ctx.aggression > 0.5 && bb.shot_momentum <= 0.0 {
                0.3 + 0.3 * ctx.aggression - 0.3 * fear - 0.2 * bb.suppress_level
                    + 0.05 * bb.miss_streak.min(3) as f64
            } else {
                0.0
            }
        }
        Goal::Overwatch => {
            if in_cover && !visible && knows_enemy {
                0.3 + 0.4 * bb.local_sightline
            } else {
                0.0
            }
        }
        Goal::Regroup => match ctx.leader_distance {
            Some(d) if d > REGROUP_DISTANCE && bb.visible_allies == 0 => {
                0.3 + 0.4 * isolation + 0.2 * fear
            }
            _ => 0.0,
        },
        Goal::Peek => {
            if in_cover && !visible && ctx.has_last_known && !bb.pinned {
                0.35 + 0.2 * (1.0 - fear)
            } else {
                0.0
            }
        }
    };
    raw - path_penalty
}
