//! Psychological model: fear, morale, and their cross-coupling.
//!
//! Fear and morale are clamped to [0, 1] at every mutation, not at use,
//! because several systems read the fields directly.

use serde::{Deserialize, Serialize};

use firefight_core::components::SoldierProfile;
use firefight_core::constants::*;
use firefight_core::types::clamp01;

/// Per-agent psychological state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PsychState {
    /// Raw fear. Use [`PsychState::effective_fear`] for decisions.
    pub fear: f64,
    pub morale: f64,
    /// Static trait.
    pub composure: f64,
    /// Static trait.
    pub experience: f64,
}

impl Default for PsychState {
    fn default() -> Self {
        Self {
            fear: 0.0,
            morale: 0.7,
            composure: 0.5,
            experience: 0.3,
        }
    }
}

/// Everything morale reacts to during one update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoraleContext {
    pub under_fire: bool,
    pub incoming_fire: u32,
    pub suppression: f64,
    pub visible_threats: usize,
    pub visible_allies: usize,
    pub isolation_ticks: u32,
    /// Fraction of the squad already down.
    pub squad_casualty_rate: f64,
    /// Mean effective fear of living squad mates.
    pub squad_stress: f64,
    /// Recent shooting success in [-1, 1].
    pub shot_momentum: f64,
    /// Openness of the agent's surroundings in [0, 1].
    pub local_sightline: f64,
    pub has_contact: bool,
}

impl PsychState {
    pub fn from_profile(profile: &SoldierProfile) -> Self {
        Self {
            fear: 0.0,
            morale: clamp01(0.55 + 0.3 * profile.discipline),
            composure: clamp01(profile.composure),
            experience: clamp01(profile.experience),
        }
    }

    /// Add fear. Negative amounts soothe.
    pub fn apply_stress(&mut self, amount: f64) {
        self.fear = clamp01(self.fear + amount);
    }

    /// Let fear bleed off over `dt` seconds. Composure and morale speed it up.
    pub fn recover_fear(&mut self, dt: f64) {
        let rate = FEAR_RECOVERY_RATE * (0.5 + 0.5 * self.composure) * (0.5 + self.morale);
        self.fear = (self.fear - rate * dt.max(0.0)).max(0.0);
    }

    /// Raw fear damped by composure and experience. Monotonic in raw fear.
    pub fn effective_fear(&self) -> f64 {
        let damping = 1.0 - 0.35 * clamp01(self.composure) - 0.25 * clamp01(self.experience);
        clamp01(self.fear * damping)
    }

    /// Move morale according to pressure and support, then apply its feedback on fear.
    pub fn update_morale(&mut self, dt: f64, discipline: f64, ctx: &MoraleContext) {
        let dt = dt.max(0.0);
        let pressure = morale_pressure(ctx);
        let support = morale_support(ctx);

        let damped_pressure = pressure * (1.0 - 0.5 * clamp01(discipline));
        self.morale = clamp01(self.morale + (support - damped_pressure) * MORALE_RATE * dt);

        let calm = !ctx.under_fire && ctx.suppression < 0.1;
        if self.morale < MORALE_CRITICAL && ctx.under_fire {
            self.apply_stress(MORALE_PANIC_NUDGE * dt);
        } else if self.morale > MORALE_HIGH && calm {
            self.recover_fear(dt * 0.5);
        }
    }
}

fn morale_pressure(ctx: &MoraleContext) -> f64 {
    let mut pressure = 0.0;
    if ctx.under_fire {
        pressure += 0.4;
    }
    pressure += ctx.incoming_fire.min(5) as f64 * 0.05;
    pressure += clamp01(ctx.suppression) * 0.3;
    pressure +=
        (ctx.isolation_ticks as f64 / ISOLATION_SATURATION_TICKS as f64).min(1.0) * 0.3;
    pressure += clamp01(ctx.squad_casualty_rate) * 0.5;
    pressure += clamp01(ctx.squad_stress) * 0.2;
    if ctx.visible_threats > ctx.visible_allies + 1 {
        pressure += 0.15;
    }
    if ctx.shot_momentum < 0.0 {
        pressure += -ctx.shot_momentum * 0.1;
    }
    pressure
}

fn morale_support(ctx: &MoraleContext) -> f64 {
    let mut support = ctx.visible_allies.min(4) as f64 * 0.05;
    if !ctx.under_fire && ctx.suppression < 0.1 {
        support += 0.2;
    }
    if ctx.shot_momentum > 0.0 {
        support += ctx.shot_momentum * 0.2;
    }
    if ctx.has_contact && ctx.visible_allies > 0 {
        support += 0.05;
    }
    support + clamp01(ctx.local_sightline) * 0.05
}
