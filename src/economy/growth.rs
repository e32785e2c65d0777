//! Troop growth

use tracing::error;

use crate::core::config::Config;
use crate::core::error::{EngineError, Result};
use crate::core::types::Troops;
use crate::world::Player;

/// Troop count of `player` after `elapsed_ticks` of growth
///
/// Applies the configured addition rate once per tick, never above the
/// player's troop cap and never below the current count. A player already
/// over its cap (it lost tiles) keeps what it has.
pub fn grow(player: &Player, elapsed_ticks: u64, config: &Config) -> Result<Troops> {
    if elapsed_ticks == 0 {
        error!(player = %player.id, "growth requested for zero elapsed ticks");
        return Err(EngineError::InvalidTick(elapsed_ticks));
    }

    let policy = config.player();
    let mut scratch = player.clone();
    for _ in 0..elapsed_ticks {
        let cap = policy.max_troops(&scratch);
        if scratch.troops >= cap {
            break;
        }
        let added = policy.troop_addition_rate(&scratch);
        if added == 0 {
            break;
        }
        scratch.troops = (scratch.troops + added).min(cap);
    }

    Ok(scratch.troops.max(player.troops))
}
