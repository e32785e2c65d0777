//! Frontline - deterministic tick-based territorial conquest engine
//!
//! Players own regions of a tile grid, grow troops every tick and expand by
//! attacking neighbouring tiles. The same configuration, map and ordered
//! intents produce the same ownership map and ledger on every replica.

pub mod bots;
pub mod combat;
pub mod core;
pub mod economy;
pub mod intent;
pub mod scheduler;
pub mod world;
