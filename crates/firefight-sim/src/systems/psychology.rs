//! Psychology pass: fear recovery, then morale with its feedback on fear.

use hecs::World;

use firefight_core::components::{Health, Soldier};
use firefight_mind::{Blackboard, MoraleContext, PsychState};

pub fn run(world: &mut World, dt: f64) {
    for (_entity, (soldier, health, bb, psych)) in
        world.query_mut::<(&Soldier, &Health, &Blackboard, &mut PsychState)>()
    {
        if !health.is_alive() {
            continue;
        }

        psych.recover_fear(dt);
        let ctx = morale_context(bb);
        psych.update_morale(dt, soldier.profile.discipline, &ctx);
    }
}

/// Assemble the morale inputs from working memory and squad signals.
pub fn morale_context(bb: &Blackboard) -> MoraleContext {
    MoraleContext {
        under_fire: bb.under_fire(),
        incoming_fire: bb.incoming_fire.max(bb.last_incoming),
        suppression: bb.suppress_level,
        visible_threats: bb.visible_count(),
        visible_allies: bb.visible_allies,
        isolation_ticks: bb.isolation_ticks,
        squad_casualty_rate: bb.squad.casualty_rate,
        squad_stress: bb.squad.stress,
        shot_momentum: bb.shot_momentum,
        local_sightline: bb.local_sightline,
        has_contact: bb.squad.has_contact,
    }
}
