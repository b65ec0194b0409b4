//! Snapshot system: queries the ECS world and builds a complete BattleSnapshot.
//!
//! Only the outcome buffer is touched: it is drained into the snapshot so
//! each resolved round is reported exactly once.

use hecs::World;

use firefight_core::components::*;
use firefight_core::enums::*;
use firefight_core::state::*;
use firefight_core::types::{Position, SimTime};
use firefight_mind::{Blackboard, PsychState};

use crate::effects::{EffectBuffers, ScoreState};
use crate::roster::Roster;
use crate::squad::Squad;

/// Build a complete BattleSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    roster: &Roster,
    squads: &[Squad],
    time: &SimTime,
    phase: BattlePhase,
    effects: &mut EffectBuffers,
    score: &ScoreState,
) -> BattleSnapshot {
    let agents = build_agents(world, roster);
    let score = build_score(&agents, score);

    BattleSnapshot {
        time: *time,
        phase,
        squads: squads.iter().map(build_squad).collect(),
        tracers: effects.tracers.clone(),
        muzzle_flashes: effects.muzzle_flashes.clone(),
        outcomes: std::mem::take(&mut effects.outcomes),
        agents,
        score,
    }
}

/// Agents in id order.
fn build_agents(world: &World, roster: &Roster) -> Vec<AgentView> {
    roster
        .iter()
        .filter_map(|(_id, entity)| {
            let soldier = world.get::<&Soldier>(entity).ok()?;
            let pos = world.get::<&Position>(entity).ok()?;
            let kin = world.get::<&Kinematics>(entity).ok()?;
            let health = world.get::<&Health>(entity).ok()?;
            let weapon = world.get::<&Weapon>(entity).ok()?;
            let psych = world.get::<&PsychState>(entity).ok()?;
            let bb = world.get::<&Blackboard>(entity).ok()?;

            Some(AgentView {
                id: soldier.id,
                team: soldier.team,
                squad: soldier.squad,
                position: *pos,
                heading: kin.heading,
                stance: kin.stance,
                health: health.hp,
                alive: health.is_alive(),
                goal: bb.current_goal,
                fire_mode: weapon.fire_mode.current,
                fear: psych.fear,
                effective_fear: psych.effective_fear(),
                morale: psych.morale,
                suppression: bb.suppress_level,
                pinned: bb.pinned,
                panicked: bb.panicked,
                known_threats: bb.threats.len(),
            })
        })
        .collect()
}

fn build_squad(squad: &Squad) -> SquadView {
    SquadView {
        id: squad.id,
        team: squad.team,
        leader: squad.leader,
        living: squad.living,
        has_contact: squad.has_contact,
        move_order: squad.move_order,
        casualty_rate: squad.casualty_rate,
        stress: squad.stress,
    }
}

fn build_score(agents: &[AgentView], score: &ScoreState) -> ScoreView {
    let alive = |team: Team| agents.iter().filter(|a| a.alive && a.team == team).count();
    ScoreView {
        blue_alive: alive(Team::Blue),
        red_alive: alive(Team::Red),
        rounds_fired: score.rounds_fired,
        hits: score.hits,
        kills: score.kills,
        ricochets: score.ricochets,
        winner: score.winner,
    }
}
