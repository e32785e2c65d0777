//! Economy resolver: troop growth and gold income

pub mod growth;
pub mod ledger;
pub mod treasury;

pub use growth::grow;
pub use ledger::{apply_updates, plan_updates, GrowthUpdate};
pub use treasury::earn;
