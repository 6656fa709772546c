//! Per-role behavior strategies
//!
//! Architecture: one [`Behavior`] per [`Role`](crate::host::Role), held in
//! the dispatcher's registry so new roles plug in without touching the
//! dispatch loop. Behaviors keep no per-unit state between ticks; what they
//! remember lives in the cooldown gate, the deferred event registry, or in
//! counters owned by the behavior itself.

pub mod combat;
pub mod gatherer;
pub mod production_hub;
pub mod secondary_producer;

pub use combat::HoldPosition;
pub use gatherer::Gatherer;
pub use production_hub::ProductionHub;
pub use secondary_producer::SecondaryProducer;

use crate::core::config::AgentConfig;
use crate::core::error::{AgentError, Result};
use crate::core::types::{Tick, UnitId};
use crate::decision::{CooldownGate, DeferredEventRegistry};
use crate::host::{Command, Host, PlayerState, UnitSnapshot};

/// Everything a behavior may read or touch while deciding for one unit
pub struct DecisionContext<'a> {
    pub tick: Tick,
    pub player: &'a PlayerState,
    pub config: &'a AgentConfig,
    pub host: &'a mut dyn Host,
    pub cooldowns: &'a mut CooldownGate,
    pub deferred: &'a mut DeferredEventRegistry,
    issued: Vec<Command>,
}

impl<'a> DecisionContext<'a> {
    pub fn new(
        tick: Tick,
        player: &'a PlayerState,
        config: &'a AgentConfig,
        host: &'a mut dyn Host,
        cooldowns: &'a mut CooldownGate,
        deferred: &'a mut DeferredEventRegistry,
    ) -> Self {
        Self {
            tick,
            player,
            config,
            host,
            cooldowns,
            deferred,
            issued: Vec::new(),
        }
    }

    /// Send a command to the host, remembering it when accepted
    pub fn issue(&mut self, command: Command) -> Result<()> {
        match self.host.issue(command) {
            Ok(()) => {
                tracing::debug!(tick = self.tick, ?command, "command issued");
                self.issued.push(command);
                Ok(())
            }
            Err(e) => {
                tracing::trace!(tick = self.tick, ?command, error = %e, "command rejected");
                Err(e)
            }
        }
    }

    /// Commands accepted so far this tick
    pub fn issued(&self) -> &[Command] {
        &self.issued
    }

    /// Has `unit` already been given an order this tick?
    pub fn already_ordered(&self, unit: UnitId) -> bool {
        self.issued.iter().any(|c| c.unit() == unit)
    }

    pub fn into_issued(self) -> Vec<Command> {
        self.issued
    }
}

/// Result of one decision; never panics, never aborts the tick
#[derive(Debug, Default)]
pub struct Outcome {
    /// Commands the host accepted
    pub issued: usize,
    /// Commands the host refused (no fallback left)
    pub failures: Vec<AgentError>,
}

impl Outcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn issued(count: usize) -> Self {
        Self {
            issued: count,
            failures: Vec::new(),
        }
    }

    pub fn failed(error: AgentError) -> Self {
        Self {
            issued: 0,
            failures: vec![error],
        }
    }

    /// Outcome of a single command attempt
    pub fn from_result(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::issued(1),
            Err(e) => Self::failed(e),
        }
    }

    pub fn merge(mut self, other: Outcome) -> Self {
        self.issued += other.issued;
        self.failures.extend(other.failures);
        self
    }

    pub fn is_noop(&self) -> bool {
        self.issued == 0 && self.failures.is_empty()
    }
}

/// Decision strategy for one role
pub trait Behavior {
    fn name(&self) -> &'static str;

    /// Decide what `unit` should do this tick
    fn decide(&mut self, unit: &UnitSnapshot, ctx: &mut DecisionContext<'_>) -> Outcome;
}
