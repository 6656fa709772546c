//! Combat units
//!
//! Fighting is out of scope for the default agent. Combat units are still
//! dispatched so a richer behavior can be registered for [`Role::Combat`]
//! without touching the dispatcher.
//!
//! [`Role::Combat`]: crate::host::Role::Combat

use crate::behavior::{Behavior, DecisionContext, Outcome};
use crate::host::UnitSnapshot;

/// Leaves combat units where they are
#[derive(Debug, Default)]
pub struct HoldPosition;

impl Behavior for HoldPosition {
    fn name(&self) -> &'static str {
        "hold-position"
    }

    fn decide(&mut self, unit: &UnitSnapshot, ctx: &mut DecisionContext<'_>) -> Outcome {
        tracing::trace!(unit = %unit.id, tick = ctx.tick, "holding position");
        Outcome::none()
    }
}
