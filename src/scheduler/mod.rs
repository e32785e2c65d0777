//! Tick scheduler: admission, resolution order, publication and replay

pub mod output;
pub mod realtime;
pub mod replay;
pub mod report;
pub mod tick;

pub use output::{SimulationOutput, SimulationStats};
pub use realtime::run_realtime;
pub use replay::{replay, IntentLog, LoggedTick};
pub use report::{EngineEvent, OwnershipChange, TickObserver, TickReport};
pub use tick::{SchedulerState, SchedulerStats, TickScheduler};
