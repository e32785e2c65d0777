//! Gold income

use tracing::error;

use crate::core::config::Config;
use crate::core::error::{EngineError, Result};
use crate::core::types::Gold;
use crate::world::Player;

/// Gold of `player` after `elapsed_ticks` of income
pub fn earn(player: &Player, elapsed_ticks: u64, config: &Config) -> Result<Gold> {
    if elapsed_ticks == 0 {
        error!(player = %player.id, "income requested for zero elapsed ticks");
        return Err(EngineError::InvalidTick(elapsed_ticks));
    }
    let per_tick = config.player().gold_addition_rate(player);
    Ok(player.gold + per_tick * elapsed_ticks)
}
