//! Production hub: supply, worker count and secondary production
//!
//! Three independent sub-decisions run every time a hub is dispatched:
//!
//! 1. **Supply** – when used supply passes a fraction of the cap, order a
//!    supply provider (cooldown gated, one at a time).
//! 2. **Workers** – keep enough harvesters for the nearby mineral fields
//!    and refineries.
//! 3. **Expansion** – once the economy is running, order a limited number
//!    of secondary production buildings (cooldown gated, one at a time).
//!
//! Construction orders share one pattern: find the closest owned builder
//! that is idle or mining, ask the host for a site near it, schedule a
//! highlight of the site, then order the build.

use crate::behavior::{Behavior, DecisionContext, Outcome};
use crate::core::error::Result;
use crate::core::types::{TilePosition, UnitId};
use crate::decision::{DecisionId, DeferredAction, Readiness};
use crate::host::{Command, UnitFilter, UnitSnapshot, UnitType};

/// Resolved construction plan, valid for the current decision only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTarget {
    pub builder: UnitId,
    pub kind: UnitType,
    pub location: TilePosition,
}

/// Resource nodes and workers counted around a hub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerCensus {
    pub mineral_fields: usize,
    pub refineries: usize,
    pub workers: usize,
}

impl WorkerCensus {
    /// Workers this base wants
    pub fn desired(&self, per_mineral_field: u32, per_refinery: u32) -> usize {
        self.mineral_fields * per_mineral_field as usize + self.refineries * per_refinery as usize
    }
}

/// Behavior for resource depots
#[derive(Debug, Default)]
pub struct ProductionHub {
    expansions_built: u32,
}

impl ProductionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Secondary production buildings ordered so far
    pub fn expansions_built(&self) -> u32 {
        self.expansions_built
    }

    fn plan_supply(&mut self, hub: &UnitSnapshot, ctx: &mut DecisionContext<'_>) -> Outcome {
        let supply = &ctx.config.supply;
        if !needs_supply(ctx.player.supply_used, ctx.player.supply_total, supply.threshold) {
            return Outcome::none();
        }

        let Some(provider) = hub.kind.race().supply_provider() else {
            return Outcome::none();
        };

        let decision = DecisionId::SupplyProvider;
        if !ctx.cooldowns.may_fire(&decision, ctx.tick, supply.check_interval)
            || ctx.host.incomplete_count(provider) > 0
        {
            return Outcome::none();
        }
        ctx.cooldowns.record_fired(decision, ctx.tick);

        let grace = supply.highlight_grace;
        match find_build_target(hub, provider, ctx) {
            Some(target) => Outcome::from_result(commit_construction(target, grace, ctx)),
            None => {
                tracing::trace!(hub = %hub.id, %provider, "no builder or site for supply");
                Outcome::none()
            }
        }
    }

    fn plan_workers(
        &mut self,
        hub: &UnitSnapshot,
        ctx: &mut DecisionContext<'_>,
    ) -> (Outcome, WorkerCensus) {
        let workers = &ctx.config.workers;
        let census = take_census(hub, ctx);
        let desired = census.desired(workers.per_mineral_field, workers.per_refinery);

        if census.workers >= desired || !hub.status.idle {
            return (Outcome::none(), census);
        }

        let Some(worker) = hub.kind.race().worker() else {
            return (Outcome::none(), census);
        };

        tracing::trace!(hub = %hub.id, have = census.workers, desired, "training worker");
        let outcome = Outcome::from_result(ctx.issue(Command::Train {
            unit: hub.id,
            kind: worker,
        }));
        (outcome, census)
    }

    fn plan_expansion(
        &mut self,
        hub: &UnitSnapshot,
        census: &WorkerCensus,
        ctx: &mut DecisionContext<'_>,
    ) -> Outcome {
        let expansion = &ctx.config.expansion;
        if census.workers <= expansion.min_workers || self.expansions_built >= expansion.max_buildings {
            return Outcome::none();
        }

        let kind = expansion.building;
        let decision = DecisionId::Expansion;
        if !ctx.cooldowns.may_fire(&decision, ctx.tick, expansion.check_interval)
            || ctx.host.incomplete_count(kind) > 0
        {
            return Outcome::none();
        }
        ctx.cooldowns.record_fired(decision, ctx.tick);

        let grace = expansion.highlight_grace;
        let Some(target) = find_build_target(hub, kind, ctx) else {
            tracing::trace!(hub = %hub.id, %kind, "no builder or site for expansion");
            return Outcome::none();
        };

        let result = commit_construction(target, grace, ctx);
        if result.is_ok() {
            self.expansions_built += 1;
            tracing::info!(%kind, built = self.expansions_built, "expansion ordered");
        }
        Outcome::from_result(result)
    }
}

impl Behavior for ProductionHub {
    fn name(&self) -> &'static str {
        "production-hub"
    }

    fn decide(&mut self, unit: &UnitSnapshot, ctx: &mut DecisionContext<'_>) -> Outcome {
        let supply = self.plan_supply(unit, ctx);
        let (workers, census) = self.plan_workers(unit, ctx);
        let expansion = self.plan_expansion(unit, &census, ctx);
        supply.merge(workers).merge(expansion)
    }
}

/// Is used supply above `threshold` of the cap?
pub fn needs_supply(used: u32, total: u32, threshold: f64) -> bool {
    used as f64 > total as f64 * threshold
}

fn take_census(hub: &UnitSnapshot, ctx: &DecisionContext<'_>) -> WorkerCensus {
    let workers = &ctx.config.workers;
    let own_workers = UnitFilter::IsWorker & UnitFilter::OwnedBy(ctx.player.id);

    WorkerCensus {
        mineral_fields: ctx
            .host
            .units_in_radius(hub.position, workers.resource_radius, &UnitFilter::IsMineralField)
            .len(),
        refineries: ctx
            .host
            .units_in_radius(hub.position, workers.resource_radius, &UnitFilter::IsRefinery)
            .len(),
        workers: ctx
            .host
            .units_in_radius(hub.position, workers.worker_radius, &own_workers)
            .len(),
    }
}

/// Closest builder for `kind` not yet ordered this tick, and a site near it
fn find_build_target(
    hub: &UnitSnapshot,
    kind: UnitType,
    ctx: &DecisionContext<'_>,
) -> Option<BuildTarget> {
    let builder_kind = kind.what_builds()?;
    let filter = ctx.issued().iter().fold(
        UnitFilter::available_builder(builder_kind, ctx.player.id),
        |filter, command| filter & !UnitFilter::Id(command.unit()),
    );
    let builder = ctx.host.closest_unit(hub.position, &filter)?;
    let location = ctx.host.build_location(kind, builder.tile())?;

    Some(BuildTarget {
        builder: builder.id,
        kind,
        location,
    })
}

/// Schedule the site highlight and order the build
fn commit_construction(target: BuildTarget, grace: u64, ctx: &mut DecisionContext<'_>) -> Result<()> {
    ctx.deferred.schedule(
        DeferredAction::HighlightBuildSite {
            kind: target.kind,
            location: target.location,
            color: ctx.player.color,
        },
        Some(Readiness::ConstructionStarted {
            kind: target.kind,
            location: target.location,
        }),
        ctx.tick,
        target.kind.build_time() + grace,
    );

    ctx.issue(Command::Build {
        unit: target.builder,
        kind: target.kind,
        location: target.location,
    })
}
