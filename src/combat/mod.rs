//! Combat resolution: land steps, boat landings and nukes
//!
//! Resolvers read a `&WorldModel` and return a plan. The matching `commit_*`
//! function applies a plan through [`crate::world::WorldModel::transfer`],
//! refusing plans that no longer match the world.

pub mod attack;
pub mod boat;
pub mod book;
pub mod nuke;
pub mod resolution;

pub use attack::{Attack, AttackKind, Conclusion};
pub use boat::{commit_landing, resolve_landing, sea_route, travel_ticks, LandingOutcome};
pub use book::AttackBook;
pub use nuke::{commit_detonation, resolve_detonation, BlastOutcome, BlastedTile, Detonation};
pub use resolution::{commit_step, resolve_step, verify_step, Contest, StepOutcome};
