//! Tick driver - one decision pass per host frame
//!
//! Order per dispatched frame:
//! frame checks -> latency throttle -> deferred event sweep -> dispatch
//!
//! The driver owns all decision memory (cooldowns, deferred events, the
//! behavior registry with its counters) so nothing survives outside it.

use serde::Serialize;

use crate::behavior::{Behavior, DecisionContext};
use crate::core::config::AgentConfig;
use crate::core::types::Tick;
use crate::decision::{CooldownGate, DeferredEventRegistry, FiredEvent};
use crate::host::{Host, Role};
use crate::render::PresentationSink;
use crate::simulation::dispatch::{DispatchStats, Dispatcher};

/// What happened on a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickStatus {
    /// Events swept and units dispatched
    Dispatched,
    /// Watching a replay; nothing to control
    Replay,
    Paused,
    /// Host reports no controlled player
    NoSelfPlayer,
    /// Between latency windows
    Throttled,
}

/// Summary of one [`TickDriver::run_tick`] call
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub frame: Tick,
    pub status: TickStatus,
    pub fired: Vec<FiredEvent>,
    pub dispatch: DispatchStats,
}

impl TickReport {
    fn skipped(frame: Tick, status: TickStatus) -> Self {
        Self {
            frame,
            status,
            fired: Vec::new(),
            dispatch: DispatchStats::default(),
        }
    }
}

/// Runs the decision pipeline against a host
#[derive(Debug)]
pub struct TickDriver {
    config: AgentConfig,
    cooldowns: CooldownGate,
    deferred: DeferredEventRegistry,
    dispatcher: Dispatcher,
}

impl TickDriver {
    /// Driver with the stock behaviors registered
    pub fn new(config: AgentConfig) -> Self {
        Self::with_dispatcher(config, Dispatcher::with_defaults())
    }

    pub fn with_dispatcher(config: AgentConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            cooldowns: CooldownGate::new(),
            deferred: DeferredEventRegistry::new(),
            dispatcher,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn cooldowns(&self) -> &CooldownGate {
        &self.cooldowns
    }

    pub fn deferred(&self) -> &DeferredEventRegistry {
        &self.deferred
    }

    /// Swap the behavior for `role`, returning the previous one
    pub fn register(&mut self, role: Role, behavior: Box<dyn Behavior>) -> Option<Box<dyn Behavior>> {
        self.dispatcher.register(role, behavior)
    }

    /// Process the host's current frame
    pub fn run_tick(&mut self, host: &mut dyn Host, sink: &mut dyn PresentationSink) -> TickReport {
        let info = host.frame();
        let now = info.frame;

        if info.replay {
            return TickReport::skipped(now, TickStatus::Replay);
        }
        if info.paused {
            return TickReport::skipped(now, TickStatus::Paused);
        }
        let Some(player) = host.self_player() else {
            return TickReport::skipped(now, TickStatus::NoSelfPlayer);
        };

        // Orders issued inside a latency window would only stack up
        if now % info.latency_frames.max(1) != 0 {
            return TickReport::skipped(now, TickStatus::Throttled);
        }

        let fired = self.deferred.advance(now, &*host, sink);
        let units = host.own_units();

        let mut ctx = DecisionContext::new(
            now,
            &player,
            &self.config,
            host,
            &mut self.cooldowns,
            &mut self.deferred,
        );
        let dispatch = self.dispatcher.dispatch(&units, &mut ctx);

        tracing::trace!(
            frame = now,
            fired = fired.len(),
            handled = dispatch.handled,
            issued = dispatch.commands_issued,
            "tick complete"
        );

        TickReport {
            frame: now,
            status: TickStatus::Dispatched,
            fired,
            dispatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Outcome;
    use crate::core::types::{PlayerId, Position, UnitId};
    use crate::decision::{DecisionId, DeferredAction, FireReason, Readiness};
    use crate::host::sim::SimulatedHost;
    use crate::host::{Command, UnitSnapshot, UnitType};
    use crate::render::RecordingSink;
    use crate::simulation::dispatch::SkipReason;
    use std::cell::RefCell;
    use std::rc::Rc;

    const ME: PlayerId = PlayerId(0);

    fn worker_and_field() -> SimulatedHost {
        let mut host = SimulatedHost::new(ME);
        host.spawn(UnitType::Scv, ME, Position::new(100, 100));
        host.spawn(UnitType::MineralField, SimulatedHost::NEUTRAL, Position::new(200, 100));
        host
    }

    #[test]
    fn test_skips_replay_pause_and_observer() {
        let mut driver = TickDriver::new(AgentConfig::default());
        let mut sink = RecordingSink::new();

        let mut host = worker_and_field();
        host.set_replay(true);
        assert_eq!(driver.run_tick(&mut host, &mut sink).status, TickStatus::Replay);

        let mut host = worker_and_field();
        host.set_paused(true);
        assert_eq!(driver.run_tick(&mut host, &mut sink).status, TickStatus::Paused);

        let mut host = worker_and_field();
        host.set_controls_player(false);
        assert_eq!(driver.run_tick(&mut host, &mut sink).status, TickStatus::NoSelfPlayer);

        assert!(host.command_log().is_empty());
    }

    #[test]
    fn test_latency_throttle() {
        let mut driver = TickDriver::new(AgentConfig::default());
        let mut sink = RecordingSink::new();
        let mut host = worker_and_field();
        host.set_latency(3);

        let statuses: Vec<_> = (0..6)
            .map(|frame| {
                host.set_frame(frame);
                driver.run_tick(&mut host, &mut sink).status
            })
            .collect();

        assert_eq!(
            statuses,
            vec![
                TickStatus::Dispatched,
                TickStatus::Throttled,
                TickStatus::Throttled,
                TickStatus::Dispatched,
                TickStatus::Throttled,
                TickStatus::Throttled,
            ]
        );
    }

    #[test]
    fn test_zero_latency_dispatches_every_frame() {
        let mut driver = TickDriver::new(AgentConfig::default());
        let mut sink = RecordingSink::new();
        let mut host = worker_and_field();
        host.set_latency(0);
        host.set_frame(7);
        assert_eq!(driver.run_tick(&mut host, &mut sink).status, TickStatus::Dispatched);
    }

    #[test]
    fn test_idle_worker_sent_to_mine() {
        let mut driver = TickDriver::new(AgentConfig::default());
        let mut sink = RecordingSink::new();
        let mut host = worker_and_field();

        let report = driver.run_tick(&mut host, &mut sink);

        assert_eq!(report.dispatch.commands_issued, 1);
        assert!(matches!(
            host.accepted_commands().next(),
            Some(Command::Gather { .. })
        ));
    }

    #[test]
    fn test_supply_build_highlights_site_once_started() {
        let mut driver = TickDriver::new(AgentConfig::default());
        let mut sink = RecordingSink::new();
        let mut host = SimulatedHost::standard_start(ME, 3);
        host.set_minerals(500);
        host.set_supply(9, 10);

        let first = driver.run_tick(&mut host, &mut sink);
        assert!(host
            .accepted_commands()
            .any(|c| matches!(c, Command::Build { kind: UnitType::SupplyDepot, .. })));
        assert!(first.fired.is_empty());
        assert_eq!(driver.deferred().len(), 1);

        // Construction started this frame, so the next sweep fires early
        host.step();
        let second = driver.run_tick(&mut host, &mut sink);
        assert_eq!(second.fired.len(), 1);
        assert_eq!(second.fired[0].reason, FireReason::Ready);
        assert!(matches!(
            second.fired[0].action,
            DeferredAction::HighlightBuildSite { kind: UnitType::SupplyDepot, .. }
        ));
        assert_eq!(sink.total(), 1);
        assert!(driver.deferred().is_empty());
    }

    #[test]
    fn test_readiness_data_flows_from_decision() {
        let mut driver = TickDriver::new(AgentConfig::default());
        let mut sink = RecordingSink::new();
        let mut host = SimulatedHost::standard_start(ME, 3);
        host.set_minerals(500);
        host.set_supply(9, 10);

        driver.run_tick(&mut host, &mut sink);
        let pending = &driver.deferred().pending()[0];
        let Some(Readiness::ConstructionStarted { kind, location }) = pending.readiness else {
            panic!("expected a construction readiness, got {:?}", pending.readiness);
        };
        assert_eq!(kind, UnitType::SupplyDepot);
        assert!(host.accepted_commands().any(|c| matches!(
            c,
            Command::Build { location: l, .. } if *l == location
        )));
    }

    #[test]
    fn test_builder_gets_one_order_per_tick() {
        let mut driver = TickDriver::new(AgentConfig::default());
        let mut sink = RecordingSink::new();
        let mut host = SimulatedHost::standard_start(ME, 3);
        host.set_minerals(500);
        host.set_supply(9, 10);

        let report = driver.run_tick(&mut host, &mut sink);

        let builder = host
            .accepted_commands()
            .find_map(|c| match c {
                Command::Build { unit, kind: UnitType::SupplyDepot, .. } => Some(*unit),
                _ => None,
            })
            .expect("depot ordered");
        let orders: Vec<_> = host
            .command_log()
            .iter()
            .filter(|r| r.command.unit() == builder)
            .collect();
        assert_eq!(orders.len(), 1, "builder orders: {orders:?}");
        assert_eq!(report.dispatch.skipped.get(&SkipReason::AlreadyOrdered), Some(&1));
        assert_eq!(driver.cooldowns().last_fired(&DecisionId::SupplyProvider), Some(0));
    }

    /// Combat strategy that only remembers who it was asked about
    struct Skirmisher {
        seen: Rc<RefCell<Vec<UnitId>>>,
    }

    impl Behavior for Skirmisher {
        fn name(&self) -> &'static str {
            "skirmisher"
        }

        fn decide(&mut self, unit: &UnitSnapshot, _ctx: &mut DecisionContext<'_>) -> Outcome {
            self.seen.borrow_mut().push(unit.id);
            Outcome::none()
        }
    }

    #[test]
    fn test_registered_combat_strategy_is_driven() {
        let mut driver = TickDriver::new(AgentConfig::default());
        let mut sink = RecordingSink::new();
        let mut host = SimulatedHost::new(ME);
        let marine = host.spawn(UnitType::Marine, ME, Position::new(400, 400));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let previous = driver.register(Role::Combat, Box::new(Skirmisher { seen: seen.clone() }));
        assert_eq!(previous.map(|b| b.name()), Some("hold-position"));

        let report = driver.run_tick(&mut host, &mut sink);

        assert_eq!(*seen.borrow(), vec![marine]);
        assert_eq!(report.dispatch.handled, 1);
        assert!(host.command_log().is_empty());
    }
}
