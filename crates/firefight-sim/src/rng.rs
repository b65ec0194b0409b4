//! Keyed randomness.
//!
//! Every draw comes from a ChaCha8 generator derived from
//! `(seed, agent, tick, stream)`. There is no shared generator, so the
//! outcome of one agent's roll never depends on how many rolls other agents
//! made before it.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use firefight_core::types::AgentId;

/// Hit/miss deflection, willingness and ricochet rolls.
pub const STREAM_FIRE: u64 = 1;
/// Path-recovery side choice.
pub const STREAM_MOVEMENT: u64 = 2;

/// Generator for one agent on one tick.
pub fn agent_rng(seed: u64, agent: AgentId, tick: u64, stream: u64) -> ChaCha8Rng {
    let key = mix(mix(seed, agent.0 as u64), tick);
    let mut rng = ChaCha8Rng::seed_from_u64(key);
    rng.set_stream(stream);
    rng
}

fn mix(a: u64, b: u64) -> u64 {
    splitmix64(a ^ splitmix64(b))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
