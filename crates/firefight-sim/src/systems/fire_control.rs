//! Fire control: trigger pulls, deliberate aim, fire-mode changes, and
//! per-round ballistic resolution.
//!
//! Runs once per team, Blue first. A shooter killed earlier in the tick never
//! fires. Each shooter resolves at most one round per tick: the first round
//! of a pull fires immediately and the rest are queued at a fixed interval
//! against the locked target.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use firefight_core::components::*;
use firefight_core::config::CombatTuning;
use firefight_core::constants::*;
use firefight_core::enums::*;
use firefight_core::events::{CombatOutcome, GunfireEvent, MuzzleFlash, Tracer};
use firefight_core::types::{clamp01, AgentId, Position};
use firefight_mind::{Blackboard, PsychState};
use firefight_terrain::geometry::point_segment_distance;
use firefight_terrain::SightQuery;

use crate::ballistics::*;
use crate::effects::{EffectBuffers, ScoreState};
use crate::rng::{agent_rng, STREAM_FIRE};
use crate::roster::Roster;

/// Discipline at which a shooter settles into deliberate aim at long range.
const DELIBERATE_AIM_DISCIPLINE: f64 = 0.6;

/// Read-only inputs shared by every shooter in a pass.
pub struct FireEnv<'a, M> {
    pub map: &'a M,
    pub roster: &'a Roster,
    pub tuning: &'a CombatTuning,
    pub seed: u64,
    pub tick: u64,
}

/// Copy of the shooter's state taken before it acts.
struct Shooter {
    id: AgentId,
    team: Team,
    position: Position,
    profile: SoldierProfile,
    kinematics: Kinematics,
    weapon: Weapon,
    alive: bool,
    blinded: bool,
    fear: f64,
    goal: Goal,
    panicked: bool,
    /// Shatter pressure forced a re-decision this tick.
    shattered: bool,
    suppression: f64,
    momentum: f64,
    squad_pressure: f64,
    sightline: f64,
    /// Visible threats, nearest first.
    visible: Vec<(AgentId, Position)>,
}

/// Where the round is going.
struct Aimpoint {
    target: AgentId,
    entity: Entity,
    position: Position,
}

/// Run fire control for every living shooter of `team`.
pub fn run<M: SightQuery>(
    world: &mut World,
    env: &FireEnv<'_, M>,
    effects: &mut EffectBuffers,
    score: &mut ScoreState,
    team: Team,
) {
    let shooters: Vec<(AgentId, Entity)> = env.roster.iter().collect();
    for (id, entity) in shooters {
        let Some(shooter) = read_shooter(world, entity) else {
            continue;
        };
        if shooter.team != team || !shooter.alive {
            continue;
        }
        let mut rng = agent_rng(env.seed, id, env.tick, STREAM_FIRE);
        let outcome = step_shooter(world, env, effects, score, &shooter, &mut rng);

        if let Ok(mut weapon) = world.get::<&mut Weapon>(entity) {
            *weapon = outcome.weapon;
        }
        if let Some(heading) = outcome.heading {
            if let Ok(mut kin) = world.get::<&mut Kinematics>(entity) {
                kin.heading = heading;
            }
        }
        if let Some(hits) = outcome.completed_pull {
            if let Ok(mut bb) = world.get::<&mut Blackboard>(entity) {
                bb.record_pull(hits);
            }
        }
    }
}

/// Shooter-side changes produced by one step.
struct StepOutcome {
    weapon: Weapon,
    heading: Option<f64>,
    /// Hits of a pull that finished this tick.
    completed_pull: Option<u32>,
}

fn step_shooter<M: SightQuery>(
    world: &mut World,
    env: &FireEnv<'_, M>,
    effects: &mut EffectBuffers,
    score: &mut ScoreState,
    shooter: &Shooter,
    rng: &mut ChaCha8Rng,
) -> StepOutcome {
    let mut out = StepOutcome {
        weapon: shooter.weapon,
        heading: None,
        completed_pull: None,
    };
    let weapon = &mut out.weapon;

    // Anything that stops this shooter drops every multi-tick action.
    if shooter.panicked || shooter.shattered || !shooter.goal.permits_fire() {
        cancel_actions(weapon);
        return out;
    }

    if let TriggerPull::Queued {
        target,
        mode,
        remaining,
        fired,
        hits,
        next_round_tick,
        spread_baseline,
    } = weapon.trigger
    {
        if env.tick < next_round_tick {
            return out;
        }
        let Some(aim) = locate(world, env, shooter, target) else {
            // Target lost: the whole pull goes, with no streak bookkeeping.
            weapon.trigger = TriggerPull::Idle;
            tracing::trace!(agent = %shooter.id, target = %target, "pull abandoned");
            return out;
        };
        if weapon.magazine == 0 {
            // Cut short: the rounds already fired still count as one pull.
            weapon.trigger = TriggerPull::Idle;
            start_reload(weapon);
            out.completed_pull = Some(hits);
            return out;
        }

        let spread = round_spread(spread_baseline, mode, fired);
        let hit = fire_round(world, env, effects, score, shooter, &aim, mode, spread, rng);
        weapon.magazine -= 1;
        out.heading = Some(shooter.position.bearing_to(&aim.position));
        let hits = hits + u32::from(hit);

        if remaining <= 1 {
            weapon.trigger = TriggerPull::Idle;
            weapon.cooldown_ticks = mode_profile(mode).cooldown_ticks;
            out.completed_pull = Some(hits);
        } else {
            weapon.trigger = TriggerPull::Queued {
                target,
                mode,
                remaining: remaining - 1,
                fired: fired + 1,
                hits,
                next_round_tick: env.tick + INTER_ROUND_TICKS,
                spread_baseline,
            };
        }
        return out;
    }

    // Fresh pull.
    let aim = if shooter.blinded {
        None
    } else {
        acquire(world, env, shooter)
    };
    if let AimState::Aiming { target, .. } = weapon.aim {
        if aim.as_ref().map(|a| a.target) != Some(target) {
            // Aim is lost with the target; no partial credit.
            weapon.aim = AimState::Idle;
        }
    }

    if weapon.cooldown_ticks > 0 || weapon.reload_ticks > 0 || weapon.fire_mode.switch_ticks > 0 {
        return out;
    }
    let Some(aim) = aim else {
        return out;
    };
    if weapon.magazine == 0 {
        start_reload(weapon);
        return out;
    }

    let distance = shooter.position.range_to(&aim.position);

    let desired = select_fire_mode(&ModeInputs {
        distance,
        sightline: shooter.sightline,
        fear: shooter.fear,
        shoot_desire: shoot_desire(shooter),
        current: weapon.fire_mode.current,
    });
    if desired != weapon.fire_mode.current {
        weapon.fire_mode.desired = desired;
        weapon.fire_mode.switch_ticks = MODE_SWITCH_TICKS;
        return out;
    }
    let mode = weapon.fire_mode.current;

    let mut aim_tightening = 1.0;
    if distance > env.tuning.accurate_range {
        match weapon.aim {
            AimState::Aiming { target, ticks } if target == aim.target => {
                if shooter.suppression > AIM_ABANDON_SUPPRESSION {
                    weapon.aim = AimState::Idle;
                    return out;
                }
                let ticks = ticks + 1;
                if ticks < AIM_TICKS {
                    weapon.aim = AimState::Aiming { target, ticks };
                    out.heading = Some(shooter.position.bearing_to(&aim.position));
                    return out;
                }
                aim_tightening = aim_factor(ticks);
                weapon.aim = AimState::Idle;
            }
            _ => {
                let willingness = long_range_willingness(
                    distance,
                    env.tuning.accurate_range,
                    env.tuning.max_fire_range,
                    shooter.profile.aggression,
                    shooter.momentum,
                    shooter.squad_pressure,
                );
                if rng.gen::<f64>() >= willingness {
                    weapon.cooldown_ticks = HESITATION_TICKS;
                    return out;
                }
                if shooter.profile.discipline >= DELIBERATE_AIM_DISCIPLINE
                    && shooter.suppression <= AIM_ABANDON_SUPPRESSION
                {
                    weapon.aim = AimState::Aiming {
                        target: aim.target,
                        ticks: 0,
                    };
                    out.heading = Some(shooter.position.bearing_to(&aim.position));
                    return out;
                }
            }
        }
    } else {
        weapon.aim = AimState::Idle;
    }

    let baseline = spread_budget(&SpreadInputs {
        mode,
        moving: shooter.kinematics.moving,
        suppression: shooter.suppression,
        fear: shooter.fear,
        stance: shooter.kinematics.stance,
        marksmanship: shooter.profile.marksmanship,
        aim_factor: aim_tightening,
    });
    let hit = fire_round(world, env, effects, score, shooter, &aim, mode, baseline, rng);
    let hits = u32::from(hit);
    weapon.magazine -= 1;
    out.heading = Some(shooter.position.bearing_to(&aim.position));

    let remaining = (mode_profile(mode).rounds - 1).min(weapon.magazine);
    if remaining > 0 {
        weapon.trigger = TriggerPull::Queued {
            target: aim.target,
            mode,
            remaining,
            fired: 1,
            hits,
            next_round_tick: env.tick + INTER_ROUND_TICKS,
            spread_baseline: baseline,
        };
    } else {
        weapon.cooldown_ticks = mode_profile(mode).cooldown_ticks;
        out.completed_pull = Some(hits);
    }
    out
}

/// Drop the trigger pull, the aim and any pending mode change.
fn cancel_actions(weapon: &mut Weapon) {
    weapon.trigger = TriggerPull::Idle;
    weapon.aim = AimState::Idle;
    weapon.fire_mode.switch_ticks = 0;
    weapon.fire_mode.desired = weapon.fire_mode.current;
}

fn start_reload(weapon: &mut Weapon) {
    if weapon.reload_ticks == 0 {
        weapon.reload_ticks = RELOAD_TICKS;
    }
}

fn shoot_desire(shooter: &Shooter) -> f64 {
    clamp01(
        shooter.profile.aggression * (1.0 - shooter.fear)
            + 0.3 * shooter.momentum.max(0.0)
            + 0.2 * shooter.squad_pressure,
    )
}

fn read_shooter(world: &World, entity: Entity) -> Option<Shooter> {
    let soldier = world.get::<&Soldier>(entity).ok()?;
    let position = *world.get::<&Position>(entity).ok()?;
    let kinematics = *world.get::<&Kinematics>(entity).ok()?;
    let weapon = *world.get::<&Weapon>(entity).ok()?;
    let health = world.get::<&Health>(entity).ok()?;
    let senses = world.get::<&Senses>(entity).ok()?;
    let psych = world.get::<&PsychState>(entity).ok()?;
    let bb = world.get::<&Blackboard>(entity).ok()?;

    let mut visible: Vec<(AgentId, Position)> = bb
        .visible_threats()
        .map(|f| (f.source, f.position))
        .collect();
    visible.sort_by(|a, b| {
        position
            .range_to(&a.1)
            .total_cmp(&position.range_to(&b.1))
            .then(a.0.cmp(&b.0))
    });

    Some(Shooter {
        id: soldier.id,
        team: soldier.team,
        position,
        profile: soldier.profile,
        kinematics,
        weapon,
        alive: health.is_alive(),
        blinded: senses.blinded_ticks > 0,
        fear: psych.effective_fear(),
        goal: bb.current_goal,
        panicked: bb.panicked,
        shattered: bb.shattered,
        suppression: bb.suppress_level,
        momentum: bb.shot_momentum,
        squad_pressure: clamp01(
            if bb.squad.has_contact { 0.5 } else { 0.0 } + bb.squad.casualty_rate,
        ),
        sightline: bb.local_sightline,
        visible,
    })
}

fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<&Health>(entity)
        .map(|h| h.is_alive())
        .unwrap_or(false)
}

/// A target is engageable while it is alive, in view, in range, and unobstructed.
fn engageable<M: SightQuery>(
    world: &World,
    env: &FireEnv<'_, M>,
    shooter: &Shooter,
    id: AgentId,
    position: &Position,
) -> Option<Aimpoint> {
    let entity = env.roster.entity(id)?;
    if !is_alive(world, entity) {
        return None;
    }
    if shooter.position.range_to(position) > env.tuning.max_fire_range {
        return None;
    }
    if !env.map.has_clear_shot(&shooter.position, position) {
        return None;
    }
    Some(Aimpoint {
        target: id,
        entity,
        position: *position,
    })
}

/// Nearest engageable visible threat.
fn acquire<M: SightQuery>(
    world: &World,
    env: &FireEnv<'_, M>,
    shooter: &Shooter,
) -> Option<Aimpoint> {
    shooter
        .visible
        .iter()
        .find_map(|(id, pos)| engageable(world, env, shooter, *id, pos))
}

/// The locked target of a queued pull, if it is still engageable.
fn locate<M: SightQuery>(
    world: &World,
    env: &FireEnv<'_, M>,
    shooter: &Shooter,
    target: AgentId,
) -> Option<Aimpoint> {
    if shooter.blinded {
        return None;
    }
    shooter
        .visible
        .iter()
        .find(|(id, _)| *id == target)
        .and_then(|(id, pos)| engageable(world, env, shooter, *id, pos))
}

/// Resolve one round. Returns whether it hit.
#[allow(clippy::too_many_arguments)]
fn fire_round<M: SightQuery>(
    world: &mut World,
    env: &FireEnv<'_, M>,
    effects: &mut EffectBuffers,
    score: &mut ScoreState,
    shooter: &Shooter,
    aim: &Aimpoint,
    mode: FireMode,
    spread: f64,
    rng: &mut ChaCha8Rng,
) -> bool {
    let distance = shooter.position.range_to(&aim.position).max(MIN_DISTANCE);
    let bearing = shooter.position.bearing_to(&aim.position);

    let stance = world
        .get::<&Kinematics>(aim.entity)
        .map(|k| k.stance)
        .unwrap_or_default();
    let cover = env
        .map
        .cover_against(&aim.position, &shooter.position)
        .map_or(0.0, |c| c.defence);
    let half_size = angular_half_size(exposed_radius(stance, cover), distance);
    let deflection = draw_deflection(rng, spread);
    let hit = deflection.abs() <= half_size;

    score.rounds_fired += 1;
    effects
        .muzzle_flashes
        .push(MuzzleFlash::new(shooter.position, bearing, shooter.team));
    effects.gunfire.push(GunfireEvent::new(
        shooter.id,
        shooter.team,
        shooter.position,
        mode,
        env.tick,
    ));
    tracing::trace!(
        shooter = %shooter.id,
        target = %aim.target,
        ?mode,
        distance,
        spread,
        deflection,
        half_size,
        hit,
        "round"
    );

    let kind = if hit {
        resolve_hit(world, env, effects, score, shooter, aim, mode, distance)
    } else {
        resolve_miss(world, env, effects, score, shooter, aim, bearing + deflection, distance, rng)
    };
    effects.outcomes.push(CombatOutcome {
        tick: env.tick,
        shooter: shooter.id,
        target: aim.target,
        kind,
    });
    hit
}

#[allow(clippy::too_many_arguments)]
fn resolve_hit<M: SightQuery>(
    world: &mut World,
    env: &FireEnv<'_, M>,
    effects: &mut EffectBuffers,
    score: &mut ScoreState,
    shooter: &Shooter,
    aim: &Aimpoint,
    mode: FireMode,
    distance: f64,
) -> OutcomeKind {
    let damage = round_damage(env.tuning.base_damage, distance, mode);
    effects.tracers.push(Tracer::new(
        shooter.position,
        aim.position,
        shooter.team,
        true,
        false,
    ));
    score.hits += 1;

    let (killed, target_team) = {
        let Ok((soldier, health, psych, bb, weapon)) = world.query_one_mut::<(
            &Soldier,
            &mut Health,
            &mut PsychState,
            &mut Blackboard,
            &mut Weapon,
        )>(aim.entity) else {
            return OutcomeKind::Hit { damage };
        };
        health.hp = (health.hp - damage).max(0.0);
        psych.apply_stress(HIT_STRESS);
        bb.register_incoming();
        if bb.add_suppression(SUPPRESS_PER_HIT) {
            tracing::debug!(agent = %aim.target, "pinned");
        }

        let killed = health.hp <= 0.0;
        if killed {
            health.vitality = Vitality::Incapacitated { tick: env.tick };
            cancel_actions(weapon);
        }
        (killed, soldier.team)
    };

    apply_witness_stress(world, target_team, aim.target, &aim.position, env.tuning.witness_radius);

    if killed {
        score.kills += 1;
        tracing::debug!(agent = %aim.target, by = %shooter.id, tick = env.tick, "incapacitated");
        OutcomeKind::Kill
    } else {
        OutcomeKind::Hit { damage }
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_miss<M: SightQuery>(
    world: &mut World,
    env: &FireEnv<'_, M>,
    effects: &mut EffectBuffers,
    score: &mut ScoreState,
    shooter: &Shooter,
    aim: &Aimpoint,
    shot_bearing: f64,
    distance: f64,
    rng: &mut ChaCha8Rng,
) -> OutcomeKind {
    if let Ok((health, psych, bb)) =
        world.query_one_mut::<(&Health, &mut PsychState, &mut Blackboard)>(aim.entity)
    {
        if health.is_alive() {
            psych.apply_stress(NEAR_MISS_STRESS);
            bb.register_incoming();
            if bb.add_suppression(SUPPRESS_PER_MISS) {
                tracing::debug!(agent = %aim.target, "pinned");
            }
        }
    }

    let end = miss_endpoint(&shooter.position, shot_bearing, distance);
    let Some(wall) = env.map.first_wall_hit(&shooter.position, &end) else {
        effects
            .tracers
            .push(Tracer::new(shooter.position, end, shooter.team, false, false));
        return OutcomeKind::Miss;
    };

    let impact = Position::from(wall.point);
    effects
        .tracers
        .push(Tracer::new(shooter.position, impact, shooter.team, false, false));
    if rng.gen::<f64>() >= env.tuning.ricochet_chance {
        return OutcomeKind::Miss;
    }

    let (from, to) = ricochet_path(&shooter.position, &end, &wall);
    effects
        .tracers
        .push(Tracer::new(from, to, shooter.team, false, true));
    apply_ricochet_stress(world, shooter.id, &from, &to);
    score.ricochets += 1;
    OutcomeKind::Ricochet
}

/// Living teammates of a hit agent flinch.
fn apply_witness_stress(world: &mut World, team: Team, victim: AgentId, at: &Position, radius: f64) {
    for (_entity, (soldier, pos, health, psych)) in
        world.query_mut::<(&Soldier, &Position, &Health, &mut PsychState)>()
    {
        if soldier.team == team
            && soldier.id != victim
            && health.is_alive()
            && pos.range_to(at) <= radius
        {
            psych.apply_stress(WITNESS_STRESS);
        }
    }
}

/// Anyone near the bounce segment, either side, except the shooter.
fn apply_ricochet_stress(world: &mut World, shooter: AgentId, from: &Position, to: &Position) {
    let (a, b) = (from.as_dvec2(), to.as_dvec2());
    for (_entity, (soldier, pos, health, psych)) in
        world.query_mut::<(&Soldier, &Position, &Health, &mut PsychState)>()
    {
        if soldier.id == shooter || !health.is_alive() {
            continue;
        }
        if point_segment_distance(pos.as_dvec2(), a, b) <= RICOCHET_STRESS_RADIUS {
            psych.apply_stress(RICOCHET_STRESS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::AgentSpec;
    use crate::world_setup::spawn_agent;
    use firefight_core::types::SquadId;

    fn spawn(world: &mut World, id: u32, team: Team, x: f64, y: f64) -> Entity {
        let at = Position::new(x, y);
        let spec = AgentSpec::new(id, SoldierArchetype::Rifleman, at, at);
        spawn_agent(world, &spec, team, SquadId(0))
    }

    fn fear(world: &World, entity: Entity) -> f64 {
        world.get::<&PsychState>(entity).unwrap().fear
    }

    #[test]
    fn test_ricochet_stress_follows_bounce_segment() {
        let mut world = World::new();
        let shooter = spawn(&mut world, 1, Team::Blue, 60.0, 0.0);
        let near_enemy = spawn(&mut world, 2, Team::Red, 100.0, 10.0);
        let near_friend = spawn(&mut world, 3, Team::Blue, 140.0, -15.0);
        let far = spawn(&mut world, 4, Team::Red, 100.0, 100.0);
        let dead = spawn(&mut world, 5, Team::Red, 100.0, 5.0);
        world.get::<&mut Health>(dead).unwrap().vitality = Vitality::Incapacitated { tick: 0 };

        apply_ricochet_stress(
            &mut world,
            AgentId(1),
            &Position::new(50.0, 0.0),
            &Position::new(150.0, 0.0),
        );

        assert_eq!(fear(&world, shooter), 0.0);
        assert_eq!(fear(&world, near_enemy), RICOCHET_STRESS);
        assert_eq!(fear(&world, near_friend), RICOCHET_STRESS);
        assert_eq!(fear(&world, far), 0.0);
        assert_eq!(fear(&world, dead), 0.0);
    }

    #[test]
    fn test_witness_stress_skips_victim_and_enemies() {
        let mut world = World::new();
        let victim = spawn(&mut world, 1, Team::Red, 100.0, 100.0);
        let mate = spawn(&mut world, 2, Team::Red, 150.0, 100.0);
        let distant_mate = spawn(&mut world, 3, Team::Red, 100.0, 300.0);
        let enemy = spawn(&mut world, 4, Team::Blue, 110.0, 100.0);

        apply_witness_stress(&mut world, Team::Red, AgentId(1), &Position::new(100.0, 100.0), 80.0);

        assert_eq!(fear(&world, victim), 0.0);
        assert_eq!(fear(&world, mate), WITNESS_STRESS);
        assert_eq!(fear(&world, distant_mate), 0.0);
        assert_eq!(fear(&world, enemy), 0.0);
    }

    #[test]
    fn test_cancel_actions_clears_pending_switch() {
        let mut weapon = Weapon {
            fire_mode: FireModeState {
                current: FireMode::Single,
                desired: FireMode::Auto,
                switch_ticks: 4,
            },
            aim: AimState::Aiming {
                target: AgentId(2),
                ticks: 3,
            },
            ..Default::default()
        };
        cancel_actions(&mut weapon);
        assert_eq!(weapon.trigger, TriggerPull::Idle);
        assert_eq!(weapon.aim, AimState::Idle);
        assert_eq!(weapon.fire_mode.switch_ticks, 0);
        assert_eq!(weapon.fire_mode.desired, FireMode::Single);
    }
}
