//! Sound pass: enemies hear this tick's gunfire.
//!
//! A heard shot becomes an unseen threat belief at the shooter's position.
//! Loud, close shots also startle.

use hecs::World;

use firefight_core::components::{Health, Soldier};
use firefight_core::constants::{HEARING_THRESHOLD, STARTLE_STRESS, STARTLE_THRESHOLD};
use firefight_core::events::GunfireEvent;
use firefight_core::types::Position;
use firefight_mind::{Blackboard, PsychState};
use firefight_terrain::SoundField;

use crate::effects::EffectBuffers;
use crate::roster::Roster;

pub fn run<S: SoundField>(
    world: &mut World,
    field: &S,
    roster: &Roster,
    effects: &EffectBuffers,
    tick: u64,
) {
    let shots: Vec<GunfireEvent> = effects.fresh_gunfire().cloned().collect();
    if shots.is_empty() {
        return;
    }

    for (_id, entity) in roster.iter() {
        let Ok((soldier, pos, health, psych, bb)) = world.query_one_mut::<(
            &Soldier,
            &Position,
            &Health,
            &mut PsychState,
            &mut Blackboard,
        )>(entity) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        for shot in shots.iter().filter(|s| s.team != soldier.team) {
            let strength = field.perceived_strength(
                &shot.position,
                pos,
                shot.loudness,
                soldier.profile.fieldcraft,
            );
            if strength < HEARING_THRESHOLD {
                continue;
            }
            bb.hear_gunfire(shot.shooter, shot.position, strength, tick);
            if strength > STARTLE_THRESHOLD {
                psych.apply_stress(STARTLE_STRESS * strength);
            }
        }
    }
}
