//! Decision pass: run the goal selector for every living agent.
//!
//! Builds a `DecisionContext` from ECS components and hands it, with the
//! agent's blackboard, to `firefight_mind::decide`.

use hecs::World;

use firefight_core::components::{Health, Soldier};
use firefight_core::config::DecisionTuning;
use firefight_core::types::Position;
use firefight_mind::{decide, Blackboard, DecisionContext, DecisionReason, PsychState};

pub fn run(world: &mut World, tuning: &DecisionTuning, tick: u64) {
    for (_entity, (soldier, pos, health, psych, bb)) in world.query_mut::<(
        &Soldier,
        &Position,
        &Health,
        &PsychState,
        &mut Blackboard,
    )>() {
        if !health.is_alive() {
            continue;
        }

        let ctx = build_context(soldier, pos, health, psych, bb, tick);
        let before = bb.current_goal;
        let held_for = tick.saturating_sub(bb.goal_since_tick);
        let decision = decide(bb, &ctx, tuning);

        if decision.reason == DecisionReason::PanicEntered && decision.changed {
            tracing::debug!(
                agent = %soldier.id,
                fear = ctx.effective_fear,
                "panic"
            );
        } else if decision.changed {
            tracing::debug!(
                agent = %soldier.id,
                from = ?before,
                to = ?decision.goal,
                reason = ?decision.reason,
                held_for,
                "goal changed"
            );
        }
    }
}

fn build_context(
    soldier: &Soldier,
    pos: &Position,
    health: &Health,
    psych: &PsychState,
    bb: &Blackboard,
    tick: u64,
) -> DecisionContext {
    let objective = bb.squad.move_order.unwrap_or(soldier.objective);
    let leader_distance = if bb.squad.is_leader {
        None
    } else {
        bb.squad.leader_position.map(|leader| pos.range_to(&leader))
    };

    DecisionContext {
        tick,
        effective_fear: psych.effective_fear(),
        morale: psych.morale,
        health_fraction: health.fraction(),
        aggression: soldier.profile.aggression,
        discipline: soldier.profile.discipline,
        visible_threats: bb.visible_count(),
        nearest_threat_distance: bb.nearest_visible(pos).map(|t| pos.range_to(&t.position)),
        has_last_known: bb.last_known().is_some(),
        leader_distance,
        objective_distance: pos.range_to(&objective),
    }
}
