//! Worker economy: keep idle harvesters busy

use crate::behavior::{Behavior, DecisionContext, Outcome};
use crate::host::{Command, UnitFilter, UnitSnapshot};

/// Sends idle workers back to mining
#[derive(Debug, Default)]
pub struct Gatherer;

impl Gatherer {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for Gatherer {
    fn name(&self) -> &'static str {
        "gatherer"
    }

    fn decide(&mut self, unit: &UnitSnapshot, ctx: &mut DecisionContext<'_>) -> Outcome {
        if !unit.status.idle {
            return Outcome::none();
        }

        // Cargo goes home before anything else
        if unit.is_carrying_cargo() && unit.status.can_return_cargo {
            return Outcome::from_result(ctx.issue(Command::ReturnCargo { unit: unit.id }));
        }

        if unit.status.has_power_up {
            return Outcome::none();
        }

        let Some(node) = ctx.host.closest_unit(unit.position, &UnitFilter::resource_node()) else {
            tracing::trace!(unit = %unit.id, "no resource node in sight");
            return Outcome::none();
        };

        // A refused gather is retried next tick since the worker stays idle
        Outcome::from_result(ctx.issue(Command::Gather {
            unit: unit.id,
            target: node.id,
        }))
    }
}
