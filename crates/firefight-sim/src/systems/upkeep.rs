//! Upkeep: per-tick resets and countdowns.
//!
//! Runs first, for every living agent, so that no counter carries over into
//! this tick's fire resolution.

use hecs::World;

use firefight_core::components::{Health, Senses, Weapon};
use firefight_core::constants::MAGAZINE_SIZE;
use firefight_mind::Blackboard;

use crate::effects::EffectBuffers;

pub fn run(world: &mut World, effects: &mut EffectBuffers, dt: f64) {
    effects.age();
    effects.outcomes.clear();

    for (_entity, (health, weapon, senses, bb)) in
        world.query_mut::<(&Health, &mut Weapon, &mut Senses, &mut Blackboard)>()
    {
        if !health.is_alive() {
            continue;
        }

        bb.begin_tick();
        bb.decay_suppression(dt);
        bb.relax_momentum(dt);

        weapon.cooldown_ticks = weapon.cooldown_ticks.saturating_sub(1);
        if weapon.reload_ticks > 0 {
            weapon.reload_ticks -= 1;
            if weapon.reload_ticks == 0 {
                weapon.magazine = MAGAZINE_SIZE;
            }
        }
        let mode = &mut weapon.fire_mode;
        if mode.switch_ticks > 0 {
            mode.switch_ticks -= 1;
            if mode.switch_ticks == 0 {
                mode.current = mode.desired;
            }
        }

        senses.blinded_ticks = senses.blinded_ticks.saturating_sub(1);
    }
}
