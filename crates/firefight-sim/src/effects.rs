//! Effect buffers and the running score.
//!
//! Fire control is the only writer. Upkeep ages and drops expired records at
//! the start of each tick; the snapshot drains combat outcomes.

use firefight_core::enums::Team;
use firefight_core::events::{CombatOutcome, GunfireEvent, MuzzleFlash, Tracer};

#[derive(Debug, Clone, Default)]
pub struct EffectBuffers {
    pub tracers: Vec<Tracer>,
    pub muzzle_flashes: Vec<MuzzleFlash>,
    pub gunfire: Vec<GunfireEvent>,
    /// Outcomes resolved since the last snapshot.
    pub outcomes: Vec<CombatOutcome>,
}

impl EffectBuffers {
    /// Age every record by one tick and drop those past their lifetime.
    pub fn age(&mut self) {
        for t in &mut self.tracers {
            t.age += 1;
        }
        self.tracers.retain(|t| t.age < t.lifetime);

        for f in &mut self.muzzle_flashes {
            f.age += 1;
        }
        self.muzzle_flashes.retain(|f| f.age < f.lifetime);

        for g in &mut self.gunfire {
            g.age += 1;
        }
        self.gunfire.retain(|g| g.age < g.lifetime);
    }

    /// Gunfire emitted during the current tick.
    pub fn fresh_gunfire(&self) -> impl Iterator<Item = &GunfireEvent> {
        self.gunfire.iter().filter(|g| g.age == 0)
    }

    pub fn clear(&mut self) {
        self.tracers.clear();
        self.muzzle_flashes.clear();
        self.gunfire.clear();
        self.outcomes.clear();
    }
}

/// Cumulative battle statistics.
#[derive(Debug, Clone, Default)]
pub struct ScoreState {
    pub rounds_fired: u32,
    pub hits: u32,
    pub kills: u32,
    pub ricochets: u32,
    pub winner: Option<Team>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use firefight_core::constants::{GUNFIRE_LIFETIME, TRACER_LIFETIME};
    use firefight_core::enums::FireMode;
    use firefight_core::types::{AgentId, Position};

    #[test]
    fn test_records_expire_at_lifetime() {
        let mut fx = EffectBuffers::default();
        fx.tracers.push(Tracer::new(
            Position::new(0.0, 0.0),
            Position::new(10.0, 0.0),
            Team::Blue,
            false,
            false,
        ));
        for _ in 0..TRACER_LIFETIME - 1 {
            fx.age();
        }
        assert_eq!(fx.tracers.len(), 1);
        fx.age();
        assert!(fx.tracers.is_empty());
    }

    #[test]
    fn test_only_new_gunfire_is_fresh() {
        let mut fx = EffectBuffers::default();
        fx.gunfire.push(GunfireEvent::new(
            AgentId(1),
            Team::Red,
            Position::new(0.0, 0.0),
            FireMode::Single,
            0,
        ));
        assert_eq!(fx.fresh_gunfire().count(), 1);
        fx.age();
        assert_eq!(fx.fresh_gunfire().count(), 0);
        for _ in 1..GUNFIRE_LIFETIME {
            fx.age();
        }
        assert!(fx.gunfire.is_empty());
    }
}
