//! Per-decision cooldown timers
//!
//! Structural decisions (new supply, new production buildings) are costly to
//! evaluate and must not be re-issued while the previous order is still
//! being carried out. The gate remembers when each decision last fired.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Tick;

/// Identifies a cooldown-gated decision
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionId {
    SupplyProvider,
    Expansion,
    /// Decisions owned by injected behaviors
    Named(String),
}

/// Last-fired record per decision
#[derive(Debug, Clone, Default)]
pub struct CooldownGate {
    last_fired: AHashMap<DecisionId, Tick>,
}

impl CooldownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// May `decision` fire at `now`?
    ///
    /// True when it never fired or at least `min_interval` ticks passed.
    /// Does not record anything; callers acting on `true` must follow up
    /// with [`record_fired`](Self::record_fired).
    pub fn may_fire(&self, decision: &DecisionId, now: Tick, min_interval: u64) -> bool {
        match self.last_fired.get(decision) {
            None => true,
            Some(&last) => now.saturating_sub(last) >= min_interval,
        }
    }

    pub fn record_fired(&mut self, decision: DecisionId, now: Tick) {
        self.last_fired.insert(decision, now);
    }

    /// `may_fire` and, on success, `record_fired` in one step
    pub fn try_fire(&mut self, decision: DecisionId, now: Tick, min_interval: u64) -> bool {
        if self.may_fire(&decision, now, min_interval) {
            self.record_fired(decision, now);
            true
        } else {
            false
        }
    }

    pub fn last_fired(&self, decision: &DecisionId) -> Option<Tick> {
        self.last_fired.get(decision).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unrecorded_decision_is_eligible() {
        let gate = CooldownGate::new();
        assert!(gate.may_fire(&DecisionId::SupplyProvider, 0, 400));
        assert!(gate.may_fire(&DecisionId::Expansion, 12345, 400));
        assert_eq!(gate.last_fired(&DecisionId::SupplyProvider), None);
    }

    #[test]
    fn test_interval_boundary() {
        let mut gate = CooldownGate::new();
        gate.record_fired(DecisionId::SupplyProvider, 100);

        assert!(!gate.may_fire(&DecisionId::SupplyProvider, 100, 400));
        assert!(!gate.may_fire(&DecisionId::SupplyProvider, 499, 400));
        assert!(gate.may_fire(&DecisionId::SupplyProvider, 500, 400));
    }

    #[test]
    fn test_decisions_are_independent() {
        let mut gate = CooldownGate::new();
        gate.record_fired(DecisionId::SupplyProvider, 10);

        assert!(!gate.may_fire(&DecisionId::SupplyProvider, 20, 400));
        assert!(gate.may_fire(&DecisionId::Expansion, 20, 400));
        assert!(gate.may_fire(&DecisionId::Named("scout".into()), 20, 400));
    }

    #[test]
    fn test_probe_has_no_side_effects() {
        let mut gate = CooldownGate::new();
        gate.record_fired(DecisionId::Expansion, 0);
        for _ in 0..5 {
            assert!(!gate.may_fire(&DecisionId::Expansion, 50, 100));
        }
        assert_eq!(gate.last_fired(&DecisionId::Expansion), Some(0));
    }

    #[test]
    fn test_try_fire_records() {
        let mut gate = CooldownGate::new();
        assert!(gate.try_fire(DecisionId::Expansion, 7, 400));
        assert!(!gate.try_fire(DecisionId::Expansion, 8, 400));
        assert_eq!(gate.last_fired(&DecisionId::Expansion), Some(7));
    }

    proptest! {
        #[test]
        fn fired_decision_waits_full_interval(
            fired_at in 0u64..1_000_000,
            interval in 1u64..10_000,
            offset in 0u64..20_000,
        ) {
            let mut gate = CooldownGate::new();
            prop_assert!(gate.try_fire(DecisionId::SupplyProvider, fired_at, interval));

            let later = fired_at + offset;
            let eligible = gate.may_fire(&DecisionId::SupplyProvider, later, interval);
            prop_assert_eq!(eligible, offset >= interval);
        }
    }
}
