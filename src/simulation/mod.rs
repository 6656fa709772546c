//! Per-frame pipeline: routing units to behaviors and driving the tick

pub mod dispatch;
pub mod tick;

pub use dispatch::{actionability, DispatchStats, Dispatcher, SkipReason};
pub use tick::{TickDriver, TickReport, TickStatus};
