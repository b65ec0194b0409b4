//! Simulation constants and tuning parameters.
//!
//! Distances are map pixels, angles radians, durations ticks unless a name says otherwise.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Bodies ---

/// Full health of a fresh agent.
pub const MAX_HEALTH: f64 = 100.0;

/// Radius of a standing agent's silhouette.
pub const BODY_RADIUS: f64 = 6.0;

/// Floor applied to every distance used as a divisor.
pub const MIN_DISTANCE: f64 = 1.0;

// --- Perception ---

/// Default sight range.
pub const SIGHT_RANGE: f64 = 700.0;

/// Ticks an unseen threat is remembered before it is dropped.
pub const THREAT_STALE_TICKS: u64 = 180;

/// Allies closer than this count as support.
pub const ALLY_SUPPORT_RADIUS: f64 = 150.0;

/// Cover closer than this to a defender can protect it.
pub const COVER_ADJACENCY: f64 = 20.0;

/// Ray length used when scoring a position's local sightlines.
pub const SIGHTLINE_PROBE_LENGTH: f64 = 300.0;

// --- Psychology ---

/// Fear recovered per second at neutral composure and morale.
pub const FEAR_RECOVERY_RATE: f64 = 0.08;

/// Morale change per second at unit pressure/support.
pub const MORALE_RATE: f64 = 0.05;

/// Morale below this is critical.
pub const MORALE_CRITICAL: f64 = 0.2;

/// Morale above this counts as high.
pub const MORALE_HIGH: f64 = 0.7;

/// Fear per second pushed in by critical morale under fire.
pub const MORALE_PANIC_NUDGE: f64 = 0.3;

/// Isolation ticks at which the isolation penalty saturates.
pub const ISOLATION_SATURATION_TICKS: u32 = 150;

// --- Decision ---

/// Effective fear at which panic takes over.
pub const PANIC_ENTER: f64 = 0.8;

/// Effective fear below which panic releases. Must be below `PANIC_ENTER`.
pub const PANIC_RECOVER: f64 = 0.5;

/// Minimum hold after a goal change.
pub const COMMIT_TICKS: u64 = 20;

/// Extendable hold following COMMIT.
pub const SUSTAIN_TICKS: u64 = 40;

/// Shatter pressure at which re-evaluation is forced.
pub const SHATTER_THRESHOLD: f64 = 1.0;

/// Shatter pressure per incoming round.
pub const SHATTER_PER_ROUND: f64 = 0.25;

/// Multiplier on shatter pressure while holding a passive goal.
pub const SHATTER_PASSIVE_WEIGHT: f64 = 1.6;

/// Shatter pressure added once when suppression pins the agent.
pub const SHATTER_ON_PIN: f64 = 0.5;

/// Utility margin a challenger must beat the current goal by.
pub const HYSTERESIS_MARGIN: f64 = 0.1;

/// Leader distance beyond which regrouping is worth it.
pub const REGROUP_DISTANCE: f64 = 200.0;

/// Isolation ticks after which an agent counts as cut off.
pub const ISOLATION_TICKS: u32 = 90;

// --- Suppression ---

/// Suppression added by a round that hits.
pub const SUPPRESS_PER_HIT: f64 = 0.2;

/// Suppression added by a round that misses nearby.
pub const SUPPRESS_PER_MISS: f64 = 0.12;

/// Suppression decay per second.
pub const SUPPRESS_DECAY: f64 = 0.35;

/// Rising edge across this level pins the agent.
pub const PIN_THRESHOLD: f64 = 0.6;

/// The pin latch releases below this level.
pub const PIN_RELEASE: f64 = 0.45;

// --- Stress ---

/// Fear applied to a target that is hit.
pub const HIT_STRESS: f64 = 0.25;

/// Fear applied to a target that is missed.
pub const NEAR_MISS_STRESS: f64 = 0.06;

/// Fear applied to living teammates near a hit target.
pub const WITNESS_STRESS: f64 = 0.08;

/// Teammates within this radius of a hit witness it.
pub const WITNESS_RADIUS: f64 = 80.0;

/// Fear applied to anyone near a ricochet.
pub const RICOCHET_STRESS: f64 = 0.04;

/// Distance from the bounce segment that still startles.
pub const RICOCHET_STRESS_RADIUS: f64 = 20.0;

// --- Weapons ---

/// Beyond this range nobody fires.
pub const MAX_FIRE_RANGE: f64 = 600.0;

/// Beyond this range firing needs a willingness roll.
pub const ACCURATE_RANGE: f64 = 300.0;

/// Inside this range damage ramps up.
pub const CQB_RANGE: f64 = 80.0;

/// Range at which the close-quarters multiplier peaks.
pub const POINT_BLANK_RANGE: f64 = 10.0;

/// Close-quarters damage multiplier at point blank.
pub const CQB_MAX_MULTIPLIER: f64 = 1.8;

/// Damage of a single round before multipliers.
pub const BASE_DAMAGE: f64 = 30.0;

/// Floor applied to every spread budget.
pub const MIN_SPREAD: f64 = 0.002;

/// Spread multiplier while moving.
pub const MOVING_SPREAD_FACTOR: f64 = 1.6;

/// Ticks a fire-mode change blocks firing.
pub const MODE_SWITCH_TICKS: u32 = 8;

/// Score bonus for keeping the active fire mode.
pub const MODE_STICKINESS: f64 = 0.15;

/// Rounds per magazine.
pub const MAGAZINE_SIZE: u32 = 30;

/// Ticks to reload.
pub const RELOAD_TICKS: u32 = 60;

/// Ticks between rounds of a queued pull.
pub const INTER_ROUND_TICKS: u64 = 2;

/// Ticks of deliberate aim before a long-range shot.
pub const AIM_TICKS: u32 = 20;

/// Spread factor reached at full deliberate aim.
pub const AIM_FULL_TIGHTENING: f64 = 0.5;

/// Suppression above which deliberate aim is abandoned.
pub const AIM_ABANDON_SUPPRESSION: f64 = 0.5;

/// Ticks before a shooter that declined a long-range shot reconsiders it.
pub const HESITATION_TICKS: u32 = 15;

/// Distance a missed round travels past its target, as a fraction of range.
pub const OVERSHOOT_FACTOR: f64 = 0.5;

/// Probability a wall-striking miss ricochets.
pub const RICOCHET_CHANCE: f64 = 0.3;

/// Fraction of remaining travel a ricochet keeps.
pub const RICOCHET_DISTANCE_FACTOR: f64 = 0.4;

// --- Effects ---

/// Ticks a tracer stays visible.
pub const TRACER_LIFETIME: u32 = 6;

/// Ticks a muzzle flash stays visible.
pub const MUZZLE_FLASH_LIFETIME: u32 = 3;

/// Ticks a gunfire event stays in the buffer.
pub const GUNFIRE_LIFETIME: u32 = 2;

// --- Sound ---

/// Gunfire of loudness 1.0 is inaudible beyond this distance.
pub const GUNFIRE_AUDIBLE_RANGE: f64 = 900.0;

/// Strength multiplier when a wall is in the way.
pub const SOUND_OCCLUSION_FACTOR: f64 = 0.5;

/// Perceived strength below this is ignored.
pub const HEARING_THRESHOLD: f64 = 0.05;

/// Perceived strength above which gunfire is startling.
pub const STARTLE_THRESHOLD: f64 = 0.7;

/// Fear from startling gunfire at strength 1.0.
pub const STARTLE_STRESS: f64 = 0.02;

// --- Movement ---

/// Standing speed per tick.
pub const WALK_SPEED: f64 = 1.5;

/// Navigation grid cell size.
pub const NAV_CELL_SIZE: f64 = 16.0;

/// Destination drift that triggers a re-path.
pub const REPATH_DISTANCE: f64 = 16.0;

/// Distance at which a waypoint counts as reached.
pub const WAYPOINT_REACHED: f64 = 2.0;

/// Lateral offset tried after a failed path.
pub const PATH_RECOVERY_OFFSET: f64 = 24.0;

/// Distance kept from a threat while falling back.
pub const FALLBACK_DISTANCE: f64 = 120.0;

/// Lateral distance of a flanking manoeuvre.
pub const FLANK_OFFSET: f64 = 100.0;

/// Spacing between formation slots behind the leader.
pub const FORMATION_SPACING: f64 = 24.0;
