//! Computer players

pub mod driver;
pub mod targets;

pub use driver::BotDriver;
pub use targets::{find_expansion_targets, spawn_candidates, ExpansionTargets};
