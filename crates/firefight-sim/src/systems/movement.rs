//! Movement: goal to destination and stance, path following, and recovery
//! when no path exists.
//!
//! A failed path never aborts the tick. The agent's path-failure EMA picks a
//! fallback instead: a short lateral offset, then anchoring on the leader,
//! then simply holding.

use std::f64::consts::{FRAC_PI_2, PI};

use hecs::World;
use rand::Rng;

use firefight_core::components::{Health, Kinematics, Navigation, Soldier};
use firefight_core::constants::*;
use firefight_core::enums::{Goal, Stance};
use firefight_core::types::Position;
use firefight_mind::Blackboard;
use firefight_terrain::{BattleMap, Pathfinder};

use crate::rng::{agent_rng, STREAM_MOVEMENT};

/// Ticks between peek toggles.
const PEEK_PERIOD: u64 = 15;

/// Where a goal wants the agent and how it should carry itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePlan {
    pub destination: Option<Position>,
    pub stance: Stance,
}

pub fn run<P: Pathfinder>(world: &mut World, paths: &P, map: &BattleMap, seed: u64, tick: u64) {
    for (_entity, (soldier, health, pos, kin, nav, bb)) in world.query_mut::<(
        &Soldier,
        &Health,
        &mut Position,
        &mut Kinematics,
        &mut Navigation,
        &mut Blackboard,
    )>() {
        if !health.is_alive() {
            kin.moving = false;
            continue;
        }

        let plan = plan_for(soldier, pos, bb, nav, tick);
        kin.stance = plan.stance;

        match plan.destination.map(|d| map.clamp(d)) {
            None => {
                nav.destination = None;
                nav.path.clear();
                bb.path_active = false;
            }
            Some(dest) => {
                let drifted = nav
                    .destination
                    .map_or(true, |d| d.range_to(&dest) > REPATH_DISTANCE);
                let stalled = nav.path.is_empty() && pos.range_to(&dest) > WAYPOINT_REACHED;
                if drifted || stalled {
                    replan(paths, map, soldier, pos, &dest, nav, bb, seed, tick);
                }
            }
        }

        let start = *pos;
        let speed = WALK_SPEED * stance_speed(kin.stance) * if bb.pinned { 0.5 } else { 1.0 };
        if let Some(next) = nav.path.first().copied() {
            *pos = pos.step_toward(&next, speed);
            if pos.range_to(&next) <= WAYPOINT_REACHED {
                nav.path.remove(0);
            }
        }

        kin.moving = start.range_to(pos) > f64::EPSILON;
        if kin.moving {
            kin.heading = start.bearing_to(pos);
        } else if let Some(threat) = bb.threat_focus(pos) {
            kin.heading = pos.bearing_to(&threat);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn replan<P: Pathfinder>(
    paths: &P,
    map: &BattleMap,
    soldier: &Soldier,
    pos: &Position,
    dest: &Position,
    nav: &mut Navigation,
    bb: &mut Blackboard,
    seed: u64,
    tick: u64,
) {
    nav.destination = Some(*dest);
    if let Some(path) = paths.find_path(pos, dest) {
        bb.record_path_attempt(true);
        nav.path = path;
        return;
    }

    bb.record_path_attempt(false);
    let ema = bb.path_failure_ema;
    let recovery = if ema < 0.3 {
        let mut rng = agent_rng(seed, soldier.id, tick, STREAM_MOVEMENT);
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let sidestep = map.clamp(pos.offset(pos.bearing_to(dest) + side * FRAC_PI_2, PATH_RECOVERY_OFFSET));
        paths.find_path(pos, &sidestep)
    } else if ema < 0.6 {
        bb.squad
            .leader_position
            .filter(|_| !bb.squad.is_leader)
            .and_then(|leader| paths.find_path(pos, &leader))
    } else {
        None
    };

    tracing::trace!(
        agent = %soldier.id,
        ema,
        recovered = recovery.is_some(),
        "no path"
    );
    nav.path = recovery.unwrap_or_default();
}

/// Translate the current goal into a destination and stance.
pub fn plan_for(
    soldier: &Soldier,
    pos: &Position,
    bb: &Blackboard,
    nav: &mut Navigation,
    tick: u64,
) -> MovePlan {
    let objective = bb.squad.move_order.unwrap_or(soldier.objective);
    let threat = bb.threat_focus(pos);
    let hunkered = if bb.pinned { Stance::Prone } else { Stance::Crouching };

    let (destination, stance) = match bb.current_goal {
        Goal::Advance => (Some(objective), Stance::Standing),
        Goal::MaintainFormation => {
            let slot_position = bb
                .squad
                .leader_position
                .filter(|_| !bb.squad.is_leader)
                .map(|leader| {
                    let behind = leader.bearing_to(&objective) + PI;
                    leader.offset(behind, FORMATION_SPACING * (bb.squad.slot + 1) as f64)
                });
            (Some(slot_position.unwrap_or(objective)), Stance::Standing)
        }
        Goal::HoldPosition | Goal::Engage => (None, hunkered),
        Goal::Survive => {
            if bb.pinned {
                (None, Stance::Prone)
            } else {
                let away = threat.map(|t| pos.offset(t.bearing_to(pos), FALLBACK_DISTANCE));
                (away, Stance::Crouching)
            }
        }
        Goal::MoveToContact => (bb.last_known().map(|f| f.position), Stance::Standing),
        Goal::Fallback => (
            Some(pos.step_toward(&soldier.origin, FALLBACK_DISTANCE)),
            Stance::Crouching,
        ),
        Goal::Flank => {
            let side = if soldier.id.0 % 2 == 0 { 1.0 } else { -1.0 };
            let wide = threat.map(|t| t.offset(t.bearing_to(pos) + side * FRAC_PI_2, FLANK_OFFSET));
            (wide, Stance::Crouching)
        }
        Goal::Overwatch => (None, Stance::Prone),
        Goal::Regroup => (
            bb.squad.leader_position.filter(|_| !bb.squad.is_leader),
            Stance::Standing,
        ),
        Goal::Peek => {
            nav.peek_out = (tick / PEEK_PERIOD) % 2 == 1;
            let stance = if nav.peek_out { Stance::Standing } else { Stance::Crouching };
            (None, stance)
        }
    };

    MovePlan { destination, stance }
}

fn stance_speed(stance: Stance) -> f64 {
    match stance {
        Stance::Standing => 1.0,
        Stance::Crouching => 0.6,
        Stance::Prone => 0.25,
    }
}
