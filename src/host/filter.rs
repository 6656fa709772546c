//! Composable unit predicates
//!
//! Filters are plain values, so they can be logged, compared and handed to
//! a host across any boundary. `&`, `|` and `!` build compound filters;
//! evaluation short-circuits left to right.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, UnitId};
use crate::host::unit::{UnitSnapshot, UnitType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitFilter {
    /// Matches everything
    Any,
    Id(UnitId),
    Kind(UnitType),
    OwnedBy(PlayerId),
    IsWorker,
    IsMineralField,
    IsRefinery,
    IsBuilding,
    IsIdle,
    IsCompleted,
    IsGatheringMinerals,
    And(Box<UnitFilter>, Box<UnitFilter>),
    Or(Box<UnitFilter>, Box<UnitFilter>),
    Not(Box<UnitFilter>),
}

impl UnitFilter {
    pub fn matches(&self, unit: &UnitSnapshot) -> bool {
        self.evaluate(unit, &mut 0)
    }

    /// `matches`, counting the leaf predicates actually evaluated
    fn evaluate(&self, unit: &UnitSnapshot, leaves: &mut usize) -> bool {
        let matched = match self {
            UnitFilter::And(a, b) => return a.evaluate(unit, leaves) && b.evaluate(unit, leaves),
            UnitFilter::Or(a, b) => return a.evaluate(unit, leaves) || b.evaluate(unit, leaves),
            UnitFilter::Not(inner) => return !inner.evaluate(unit, leaves),
            UnitFilter::Any => true,
            UnitFilter::Id(id) => unit.id == *id,
            UnitFilter::Kind(kind) => unit.kind == *kind,
            UnitFilter::OwnedBy(player) => unit.owner == *player,
            UnitFilter::IsWorker => unit.kind.is_worker(),
            UnitFilter::IsMineralField => unit.kind.is_mineral_field(),
            UnitFilter::IsRefinery => unit.kind.is_refinery(),
            UnitFilter::IsBuilding => unit.kind.is_building(),
            UnitFilter::IsIdle => unit.status.idle,
            UnitFilter::IsCompleted => unit.status.completed,
            UnitFilter::IsGatheringMinerals => unit.status.gathering_minerals,
        };
        *leaves += 1;
        matched
    }

    /// Resource nodes a worker can be sent to
    pub fn resource_node() -> Self {
        UnitFilter::IsMineralField | UnitFilter::IsRefinery
    }

    /// Owned units of `kind` that are free to take a construction order
    pub fn available_builder(kind: UnitType, owner: PlayerId) -> Self {
        UnitFilter::Kind(kind)
            & UnitFilter::IsCompleted
            & (UnitFilter::IsIdle | UnitFilter::IsGatheringMinerals)
            & UnitFilter::OwnedBy(owner)
    }
}

impl std::ops::BitAnd for UnitFilter {
    type Output = UnitFilter;
    fn bitand(self, rhs: UnitFilter) -> UnitFilter {
        UnitFilter::And(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::BitOr for UnitFilter {
    type Output = UnitFilter;
    fn bitor(self, rhs: UnitFilter) -> UnitFilter {
        UnitFilter::Or(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Not for UnitFilter {
    type Output = UnitFilter;
    fn not(self) -> UnitFilter {
        UnitFilter::Not(Box::new(self))
    }
}
