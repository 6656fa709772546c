//! Barracks-style producers: keep training, fall back to an add-on

use crate::behavior::{Behavior, DecisionContext, Outcome};
use crate::host::{Command, UnitSnapshot};

/// Trains the configured unit whenever the producer is idle
#[derive(Debug, Default)]
pub struct SecondaryProducer;

impl SecondaryProducer {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for SecondaryProducer {
    fn name(&self) -> &'static str {
        "secondary-producer"
    }

    fn decide(&mut self, unit: &UnitSnapshot, ctx: &mut DecisionContext<'_>) -> Outcome {
        if !unit.status.idle {
            return Outcome::none();
        }

        let production = &ctx.config.production;
        let (trains, fallback) = (production.trains, production.fallback_addon);

        let refused = match ctx.issue(Command::Train {
            unit: unit.id,
            kind: trains,
        }) {
            Ok(()) => return Outcome::issued(1),
            Err(e) => e,
        };

        let Some(addon) = fallback else {
            return Outcome::failed(refused);
        };

        tracing::trace!(unit = %unit.id, reason = %refused, %addon, "training refused, trying add-on");
        // Only the add-on's result is reported; the refused training is expected
        Outcome::from_result(ctx.issue(Command::BuildAddon {
            unit: unit.id,
            kind: addon,
        }))
    }
}
