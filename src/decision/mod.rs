//! Decision memory shared by all behaviors: cooldown timers and deferred
//! follow-up events. Both live for the whole match and are owned by the
//! tick driver.

pub mod cooldown;
pub mod deferred;

pub use cooldown::{CooldownGate, DecisionId};
pub use deferred::{
    DeferredAction, DeferredEvent, DeferredEventRegistry, EventId, FireReason, FiredEvent,
    Readiness,
};
