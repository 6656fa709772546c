//! Entity dispatcher
//!
//! Filters out units that cannot act this frame and routes the rest to the
//! behavior registered for their role.

use ahash::AHashMap;
use serde::Serialize;

use crate::behavior::{Behavior, DecisionContext, Gatherer, HoldPosition, ProductionHub, SecondaryProducer};
use crate::host::{Role, UnitSnapshot};

/// Why a unit was not dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SkipReason {
    /// Gone from the game
    Missing,
    /// Locked down, maelstrommed, stasised or stuck
    Incapacitated,
    /// Incomplete, under construction or morphing
    NotOperational,
    /// Carried inside another unit
    Loaded,
    Unpowered,
    /// Already given an order earlier in the same pass
    AlreadyOrdered,
}

/// Can this unit take orders right now?
pub fn actionability(unit: &UnitSnapshot) -> Result<(), SkipReason> {
    let s = &unit.status;
    if !s.exists {
        return Err(SkipReason::Missing);
    }
    if s.locked_down || s.maelstrommed || s.stasised || s.stuck {
        return Err(SkipReason::Incapacitated);
    }
    if !s.completed || s.constructing || s.morphing {
        return Err(SkipReason::NotOperational);
    }
    if s.loaded {
        return Err(SkipReason::Loaded);
    }
    if !s.powered {
        return Err(SkipReason::Unpowered);
    }
    Ok(())
}

/// Counters for one dispatch pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub considered: usize,
    pub skipped: AHashMap<SkipReason, usize>,
    /// Units a behavior decided for
    pub handled: usize,
    /// Actionable units with no role or no registered behavior
    pub unhandled: usize,
    pub commands_issued: usize,
    pub failures: usize,
}

impl DispatchStats {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn merge(&mut self, other: &DispatchStats) {
        self.considered += other.considered;
        for (reason, count) in &other.skipped {
            *self.skipped.entry(*reason).or_default() += count;
        }
        self.handled += other.handled;
        self.unhandled += other.unhandled;
        self.commands_issued += other.commands_issued;
        self.failures += other.failures;
    }
}

/// Role → behavior registry
#[derive(Default)]
pub struct Dispatcher {
    behaviors: AHashMap<Role, Box<dyn Behavior>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.behaviors.iter().map(|(r, b)| (*r, b.name())).collect();
        names.sort_by_key(|(_, name)| *name);
        f.debug_struct("Dispatcher").field("behaviors", &names).finish()
    }
}

impl Dispatcher {
    /// Empty registry; every unit is unhandled until behaviors are registered
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock behavior for every role
    pub fn with_defaults() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Role::Gatherer, Box::new(Gatherer::new()));
        dispatcher.register(Role::ProductionHub, Box::new(ProductionHub::new()));
        dispatcher.register(Role::SecondaryProducer, Box::new(SecondaryProducer::new()));
        dispatcher.register(Role::Combat, Box::new(HoldPosition));
        dispatcher
    }

    /// Install `behavior` for `role`, returning the one it replaces
    pub fn register(&mut self, role: Role, behavior: Box<dyn Behavior>) -> Option<Box<dyn Behavior>> {
        tracing::debug!(?role, behavior = behavior.name(), "behavior registered");
        self.behaviors.insert(role, behavior)
    }

    pub fn behavior(&self, role: Role) -> Option<&dyn Behavior> {
        self.behaviors.get(&role).map(|b| b.as_ref())
    }

    /// Run one decision for every actionable unit in `units`
    pub fn dispatch(&mut self, units: &[UnitSnapshot], ctx: &mut DecisionContext<'_>) -> DispatchStats {
        let mut stats = DispatchStats::default();

        for unit in units {
            stats.considered += 1;

            if let Err(reason) = actionability(unit) {
                tracing::trace!(unit = %unit.id, kind = %unit.kind, ?reason, "skipped");
                *stats.skipped.entry(reason).or_default() += 1;
                continue;
            }

            // One order per unit per tick
            if ctx.already_ordered(unit.id) {
                tracing::trace!(unit = %unit.id, kind = %unit.kind, "already ordered this tick");
                *stats.skipped.entry(SkipReason::AlreadyOrdered).or_default() += 1;
                continue;
            }

            let Some(behavior) = unit.kind.role().and_then(|role| self.behaviors.get_mut(&role)) else {
                stats.unhandled += 1;
                continue;
            };

            tracing::trace!(unit = %unit.id, kind = %unit.kind, behavior = behavior.name(), "dispatching");
            let outcome = behavior.decide(unit, ctx);
            stats.handled += 1;
            stats.commands_issued += outcome.issued;
            stats.failures += outcome.failures.len();
            for failure in &outcome.failures {
                tracing::debug!(unit = %unit.id, behavior = behavior.name(), error = %failure, "decision failed");
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::testing::{player, ME};
    use crate::behavior::Outcome;
    use crate::core::config::AgentConfig;
    use crate::core::types::{Position, UnitId};
    use crate::decision::{CooldownGate, DeferredEventRegistry};
    use crate::host::sim::SimulatedHost;
    use crate::host::{Command, Host, UnitStatus, UnitType};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every unit it is asked about
    struct Spy {
        seen: Rc<RefCell<Vec<UnitId>>>,
    }

    impl Behavior for Spy {
        fn name(&self) -> &'static str {
            "spy"
        }

        fn decide(&mut self, unit: &UnitSnapshot, _ctx: &mut DecisionContext<'_>) -> Outcome {
            self.seen.borrow_mut().push(unit.id);
            Outcome::none()
        }
    }

    fn spy_dispatcher() -> (Dispatcher, Rc<RefCell<Vec<UnitId>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        for role in [Role::Gatherer, Role::ProductionHub, Role::SecondaryProducer, Role::Combat] {
            dispatcher.register(role, Box::new(Spy { seen: seen.clone() }));
        }
        (dispatcher, seen)
    }

    fn run(dispatcher: &mut Dispatcher, units: &[UnitSnapshot]) -> DispatchStats {
        let mut host = SimulatedHost::new(ME);
        let me = player(4, 10);
        let config = AgentConfig::default();
        let mut cooldowns = CooldownGate::new();
        let mut deferred = DeferredEventRegistry::new();
        let mut ctx = DecisionContext::new(0, &me, &config, &mut host, &mut cooldowns, &mut deferred);
        dispatcher.dispatch(units, &mut ctx)
    }

    fn unit(id: u32, kind: UnitType, status: UnitStatus) -> UnitSnapshot {
        UnitSnapshot::new(UnitId(id), kind, ME, Position::new(100, 100)).with_status(status)
    }

    #[test]
    fn test_actionability_classification() {
        let ok = UnitStatus::default();
        assert_eq!(actionability(&unit(1, UnitType::Scv, ok)), Ok(()));

        let cases = [
            (UnitStatus { exists: false, ..ok }, SkipReason::Missing),
            (UnitStatus { locked_down: true, ..ok }, SkipReason::Incapacitated),
            (UnitStatus { maelstrommed: true, ..ok }, SkipReason::Incapacitated),
            (UnitStatus { stasised: true, ..ok }, SkipReason::Incapacitated),
            (UnitStatus { stuck: true, ..ok }, SkipReason::Incapacitated),
            (UnitStatus { completed: false, ..ok }, SkipReason::NotOperational),
            (UnitStatus { constructing: true, ..ok }, SkipReason::NotOperational),
            (UnitStatus { morphing: true, ..ok }, SkipReason::NotOperational),
            (UnitStatus { loaded: true, ..ok }, SkipReason::Loaded),
            (UnitStatus { powered: false, ..ok }, SkipReason::Unpowered),
        ];
        for (status, expected) in cases {
            assert_eq!(actionability(&unit(1, UnitType::Scv, status)), Err(expected), "{status:?}");
        }
    }

    #[test]
    fn test_routes_by_role() {
        let (mut dispatcher, seen) = spy_dispatcher();
        let units = vec![
            unit(1, UnitType::Scv, UnitStatus::default()),
            unit(2, UnitType::SupplyDepot, UnitStatus::default()),
            unit(3, UnitType::Marine, UnitStatus::default()),
            unit(4, UnitType::Scv, UnitStatus { stuck: true, ..UnitStatus::default() }),
        ];

        let stats = run(&mut dispatcher, &units);

        assert_eq!(*seen.borrow(), vec![UnitId(1), UnitId(3)]);
        assert_eq!(stats.considered, 4);
        assert_eq!(stats.handled, 2);
        assert_eq!(stats.unhandled, 1);
        assert_eq!(stats.skipped.get(&SkipReason::Incapacitated), Some(&1));
    }

    #[test]
    fn test_missing_behavior_is_noop() {
        let mut dispatcher = Dispatcher::new();
        let stats = run(&mut dispatcher, &[unit(1, UnitType::Scv, UnitStatus::default())]);
        assert_eq!(stats.unhandled, 1);
        assert_eq!(stats.handled, 0);
    }

    #[test]
    fn test_register_replaces_previous() {
        let mut dispatcher = Dispatcher::with_defaults();
        assert_eq!(dispatcher.behavior(Role::Combat).map(|b| b.name()), Some("hold-position"));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let previous = dispatcher.register(Role::Combat, Box::new(Spy { seen }));
        assert_eq!(previous.map(|b| b.name()), Some("hold-position"));
        assert_eq!(dispatcher.behavior(Role::Combat).map(|b| b.name()), Some("spy"));
    }

    /// Sends one particular worker to mine, whichever unit it decides for
    struct Foreman {
        worker: UnitId,
        field: UnitId,
    }

    impl Behavior for Foreman {
        fn name(&self) -> &'static str {
            "foreman"
        }

        fn decide(&mut self, _unit: &UnitSnapshot, ctx: &mut DecisionContext<'_>) -> Outcome {
            Outcome::from_result(ctx.issue(Command::Gather {
                unit: self.worker,
                target: self.field,
            }))
        }
    }

    #[test]
    fn test_unit_ordered_earlier_in_pass_is_skipped() {
        let mut host = SimulatedHost::new(ME);
        host.spawn(UnitType::CommandCenter, ME, Position::new(400, 400));
        let worker = host.spawn(UnitType::Scv, ME, Position::new(400, 520));
        let field = host.spawn(UnitType::MineralField, SimulatedHost::NEUTRAL, Position::new(250, 400));

        let (mut dispatcher, seen) = spy_dispatcher();
        dispatcher.register(Role::ProductionHub, Box::new(Foreman { worker, field }));

        let units = host.own_units();
        let me = player(4, 10);
        let config = AgentConfig::default();
        let mut cooldowns = CooldownGate::new();
        let mut deferred = DeferredEventRegistry::new();
        let mut ctx = DecisionContext::new(0, &me, &config, &mut host, &mut cooldowns, &mut deferred);
        let stats = dispatcher.dispatch(&units, &mut ctx);

        assert!(ctx.already_ordered(worker));
        assert!(seen.borrow().is_empty());
        assert_eq!(stats.handled, 1);
        assert_eq!(stats.skipped.get(&SkipReason::AlreadyOrdered), Some(&1));
        assert_eq!(stats.skipped_total(), 1);
    }

    #[test]
    fn test_stats_merge_adds_counts() {
        let mut total = DispatchStats::default();
        let mut frame = DispatchStats {
            considered: 3,
            handled: 2,
            commands_issued: 1,
            ..DispatchStats::default()
        };
        frame.skipped.insert(SkipReason::Unpowered, 1);

        total.merge(&frame);
        total.merge(&frame);

        assert_eq!(total.considered, 6);
        assert_eq!(total.handled, 4);
        assert_eq!(total.commands_issued, 2);
        assert_eq!(total.skipped_total(), 2);
    }

    fn any_status() -> impl Strategy<Value = UnitStatus> {
        prop::array::uniform16(any::<bool>()).prop_map(|f| UnitStatus {
            exists: f[0],
            completed: f[1],
            constructing: f[2],
            morphing: f[3],
            locked_down: f[4],
            maelstrommed: f[5],
            stasised: f[6],
            loaded: f[7],
            powered: f[8],
            stuck: f[9],
            idle: f[10],
            carrying_minerals: f[11],
            carrying_gas: f[12],
            can_return_cargo: f[13],
            has_power_up: f[14],
            gathering_minerals: f[15],
        })
    }

    proptest! {
        #[test]
        fn missing_units_never_reach_a_behavior(
            status in any_status(),
            kind in prop::sample::select(UnitType::ALL.to_vec()),
        ) {
            let (mut dispatcher, seen) = spy_dispatcher();
            let gone = unit(7, kind, UnitStatus { exists: false, ..status });

            let stats = run(&mut dispatcher, &[gone]);

            prop_assert!(seen.borrow().is_empty());
            prop_assert_eq!(stats.skipped.get(&SkipReason::Missing), Some(&1));
        }

        #[test]
        fn dispatched_units_are_actionable(status in any_status()) {
            let (mut dispatcher, seen) = spy_dispatcher();
            let candidate = unit(8, UnitType::Scv, status);

            run(&mut dispatcher, &[candidate.clone()]);

            prop_assert_eq!(!seen.borrow().is_empty(), actionability(&candidate).is_ok());
        }
    }
}
