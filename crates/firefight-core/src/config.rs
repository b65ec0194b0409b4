//! Engine configuration.
//!
//! Defaults come from `constants`. A TOML document may override any subset:
//!
//! ```toml
//! seed = 7
//!
//! [tuning.decision]
//! panic_enter = 0.85
//!
//! [tuning.combat]
//! ricochet_chance = 0.2
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SimError};

/// Configuration for starting a new battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same battle.
    pub seed: u64,
    pub tuning: Tuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tuning: Tuning::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(text)?;
        config.tuning.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub decision: DecisionTuning,
    pub combat: CombatTuning,
}

/// Thresholds of the goal selector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionTuning {
    pub panic_enter: f64,
    pub panic_recover: f64,
    pub commit_ticks: u64,
    pub sustain_ticks: u64,
    pub shatter_threshold: f64,
    pub hysteresis_margin: f64,
}

impl Default for DecisionTuning {
    fn default() -> Self {
        Self {
            panic_enter: PANIC_ENTER,
            panic_recover: PANIC_RECOVER,
            commit_ticks: COMMIT_TICKS,
            sustain_ticks: SUSTAIN_TICKS,
            shatter_threshold: SHATTER_THRESHOLD,
            hysteresis_margin: HYSTERESIS_MARGIN,
        }
    }
}

/// Knobs of the ballistic resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub max_fire_range: f64,
    pub accurate_range: f64,
    pub base_damage: f64,
    pub ricochet_chance: f64,
    pub witness_radius: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            max_fire_range: MAX_FIRE_RANGE,
            accurate_range: ACCURATE_RANGE,
            base_damage: BASE_DAMAGE,
            ricochet_chance: RICOCHET_CHANCE,
            witness_radius: WITNESS_RADIUS,
        }
    }
}

impl Tuning {
    /// Reject values that would break an invariant of the decision loop.
    pub fn validate(&self) -> Result<()> {
        let d = &self.decision;
        if !(0.0..=1.0).contains(&d.panic_enter) {
            return Err(SimError::InvalidTuning(format!(
                "panic_enter {} outside [0, 1]",
                d.panic_enter
            )));
        }
        if d.panic_recover >= d.panic_enter {
            return Err(SimError::InvalidTuning(format!(
                "panic_recover {} must be below panic_enter {}",
                d.panic_recover, d.panic_enter
            )));
        }
        if d.shatter_threshold <= 0.0 {
            return Err(SimError::InvalidTuning(
                "shatter_threshold must be positive".to_string(),
            ));
        }
        if d.hysteresis_margin < 0.0 {
            return Err(SimError::InvalidTuning(
                "hysteresis_margin must not be negative".to_string(),
            ));
        }

        let c = &self.combat;
        if c.accurate_range > c.max_fire_range {
            return Err(SimError::InvalidTuning(format!(
                "accurate_range {} exceeds max_fire_range {}",
                c.accurate_range, c.max_fire_range
            )));
        }
        if !(0.0..=1.0).contains(&c.ricochet_chance) {
            return Err(SimError::InvalidTuning(format!(
                "ricochet_chance {} outside [0, 1]",
                c.ricochet_chance
            )));
        }
        if c.base_damage < 0.0 {
            return Err(SimError::InvalidTuning(
                "base_damage must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
