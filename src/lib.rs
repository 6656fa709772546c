//! Frontier Bot - tick-driven agent for a real-time strategy host
//!
//! Every frame the agent reads unit snapshots from a [`host::Host`], routes
//! each actionable unit to the behavior registered for its role, and sends
//! commands back. Decisions that must not repeat too often go through a
//! cooldown gate; follow-ups that should happen later (build-site overlays)
//! are parked in a deferred event registry and fired by the tick driver.

pub mod agent;
pub mod behavior;
pub mod core;
pub mod decision;
pub mod host;
pub mod render;
pub mod simulation;

pub use agent::Agent;
pub use core::config::AgentConfig;
pub use core::error::{AgentError, Result};
