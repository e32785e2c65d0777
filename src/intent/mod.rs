//! Intent gateway: player commands and the rules that admit them

pub mod action;
pub mod admission;

pub use action::Intent;
pub use admission::{admit, Admission};
