//! Unit kinds and per-frame unit snapshots

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, Position, Race, TilePosition, UnitId, TILE_SIZE};

/// Classification that decides which behavior handles a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Harvests resources and constructs buildings
    Gatherer,
    /// Resource depot that manages supply, workers and expansion
    ProductionHub,
    /// Trains basic combat units
    SecondaryProducer,
    /// Fighting unit
    Combat,
}

/// Unit kinds the default behaviors know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Scv,
    CommandCenter,
    SupplyDepot,
    Refinery,
    Barracks,
    Marine,
    MineralField,
    VespeneGeyser,
}

impl UnitType {
    pub const ALL: [UnitType; 8] = [
        UnitType::Scv,
        UnitType::CommandCenter,
        UnitType::SupplyDepot,
        UnitType::Refinery,
        UnitType::Barracks,
        UnitType::Marine,
        UnitType::MineralField,
        UnitType::VespeneGeyser,
    ];

    /// Behavior role, `None` for kinds that are never dispatched
    pub fn role(self) -> Option<Role> {
        match self {
            UnitType::Scv => Some(Role::Gatherer),
            UnitType::CommandCenter => Some(Role::ProductionHub),
            UnitType::Barracks => Some(Role::SecondaryProducer),
            UnitType::Marine => Some(Role::Combat),
            _ => None,
        }
    }

    pub fn race(self) -> Race {
        match self {
            UnitType::MineralField | UnitType::VespeneGeyser => Race::Unknown,
            _ => Race::Terran,
        }
    }

    /// Frames needed to train or construct
    pub fn build_time(self) -> u64 {
        match self {
            UnitType::Scv => 300,
            UnitType::CommandCenter => 1800,
            UnitType::SupplyDepot => 600,
            UnitType::Refinery => 600,
            UnitType::Barracks => 1200,
            UnitType::Marine => 360,
            UnitType::MineralField | UnitType::VespeneGeyser => 0,
        }
    }

    /// Footprint in build tiles
    pub fn tile_size(self) -> TilePosition {
        match self {
            UnitType::CommandCenter | UnitType::Barracks => TilePosition::new(4, 3),
            UnitType::SupplyDepot => TilePosition::new(3, 2),
            UnitType::Refinery | UnitType::VespeneGeyser => TilePosition::new(4, 2),
            UnitType::MineralField => TilePosition::new(2, 1),
            UnitType::Scv | UnitType::Marine => TilePosition::new(1, 1),
        }
    }

    /// Kind that trains or constructs this one
    pub fn what_builds(self) -> Option<UnitType> {
        match self {
            UnitType::Scv => Some(UnitType::CommandCenter),
            UnitType::Marine => Some(UnitType::Barracks),
            UnitType::CommandCenter
            | UnitType::SupplyDepot
            | UnitType::Refinery
            | UnitType::Barracks => Some(UnitType::Scv),
            UnitType::MineralField | UnitType::VespeneGeyser => None,
        }
    }

    pub fn mineral_price(self) -> u32 {
        match self {
            UnitType::Scv | UnitType::Marine => 50,
            UnitType::CommandCenter => 400,
            UnitType::SupplyDepot | UnitType::Refinery => 100,
            UnitType::Barracks => 150,
            UnitType::MineralField | UnitType::VespeneGeyser => 0,
        }
    }

    /// Supply this kind adds to its owner's capacity once complete
    pub fn supply_provided(self) -> u32 {
        match self {
            UnitType::CommandCenter => 10,
            UnitType::SupplyDepot => 8,
            _ => 0,
        }
    }

    /// Supply this kind occupies
    pub fn supply_required(self) -> u32 {
        match self {
            UnitType::Scv | UnitType::Marine => 1,
            _ => 0,
        }
    }

    pub fn is_building(self) -> bool {
        matches!(
            self,
            UnitType::CommandCenter | UnitType::SupplyDepot | UnitType::Refinery | UnitType::Barracks
        )
    }

    pub fn is_worker(self) -> bool {
        self == UnitType::Scv
    }

    pub fn is_mineral_field(self) -> bool {
        self == UnitType::MineralField
    }

    pub fn is_refinery(self) -> bool {
        self == UnitType::Refinery
    }

    pub fn is_resource_depot(self) -> bool {
        self == UnitType::CommandCenter
    }

    /// Pixel center of this kind's footprint when placed at `top_left`
    pub fn center_at(self, top_left: TilePosition) -> Position {
        let size = self.tile_size();
        let origin = top_left.to_position();
        Position::new(
            origin.x + size.x * TILE_SIZE / 2,
            origin.y + size.y * TILE_SIZE / 2,
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitType::Scv => "Terran SCV",
            UnitType::CommandCenter => "Terran Command Center",
            UnitType::SupplyDepot => "Terran Supply Depot",
            UnitType::Refinery => "Terran Refinery",
            UnitType::Barracks => "Terran Barracks",
            UnitType::Marine => "Terran Marine",
            UnitType::MineralField => "Resource Mineral Field",
            UnitType::VespeneGeyser => "Resource Vespene Geyser",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Race {
    /// Structure that raises this race's supply cap
    pub fn supply_provider(self) -> Option<UnitType> {
        match self {
            Race::Terran => Some(UnitType::SupplyDepot),
            _ => None,
        }
    }

    /// This race's harvester
    pub fn worker(self) -> Option<UnitType> {
        match self {
            Race::Terran => Some(UnitType::Scv),
            _ => None,
        }
    }
}

/// Status flags observed on a unit this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStatus {
    pub exists: bool,
    pub completed: bool,
    pub constructing: bool,
    pub morphing: bool,
    pub locked_down: bool,
    pub maelstrommed: bool,
    pub stasised: bool,
    pub loaded: bool,
    pub powered: bool,
    pub stuck: bool,
    pub idle: bool,
    pub carrying_minerals: bool,
    pub carrying_gas: bool,
    pub can_return_cargo: bool,
    pub has_power_up: bool,
    pub gathering_minerals: bool,
}

impl Default for UnitStatus {
    /// A finished, powered, idle unit with nothing special going on
    fn default() -> Self {
        Self {
            exists: true,
            completed: true,
            constructing: false,
            morphing: false,
            locked_down: false,
            maelstrommed: false,
            stasised: false,
            loaded: false,
            powered: true,
            stuck: false,
            idle: true,
            carrying_minerals: false,
            carrying_gas: false,
            can_return_cargo: false,
            has_power_up: false,
            gathering_minerals: false,
        }
    }
}

/// Read-only copy of a unit's observable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub kind: UnitType,
    pub owner: PlayerId,
    pub position: Position,
    pub status: UnitStatus,
}

impl UnitSnapshot {
    pub fn new(id: UnitId, kind: UnitType, owner: PlayerId, position: Position) -> Self {
        Self {
            id,
            kind,
            owner,
            position,
            status: UnitStatus::default(),
        }
    }

    pub fn with_status(mut self, status: UnitStatus) -> Self {
        self.status = status;
        self
    }

    /// Top-left tile of the unit's footprint
    pub fn tile(&self) -> TilePosition {
        let size = self.kind.tile_size();
        Position::new(
            self.position.x - size.x * TILE_SIZE / 2,
            self.position.y - size.y * TILE_SIZE / 2,
        )
        .to_tile()
    }

    pub fn is_carrying_cargo(&self) -> bool {
        self.status.carrying_minerals || self.status.carrying_gas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_cover_default_behaviors() {
        assert_eq!(UnitType::Scv.role(), Some(Role::Gatherer));
        assert_eq!(UnitType::CommandCenter.role(), Some(Role::ProductionHub));
        assert_eq!(UnitType::Barracks.role(), Some(Role::SecondaryProducer));
        assert_eq!(UnitType::Marine.role(), Some(Role::Combat));
        assert_eq!(UnitType::MineralField.role(), None);
        assert_eq!(UnitType::SupplyDepot.role(), None);
    }

    #[test]
    fn test_structures_are_built_by_workers() {
        for kind in UnitType::ALL {
            if kind.is_building() {
                assert_eq!(kind.what_builds(), Some(UnitType::Scv), "{kind}");
            }
        }
    }

    #[test]
    fn test_terran_race_tables() {
        assert_eq!(Race::Terran.supply_provider(), Some(UnitType::SupplyDepot));
        assert_eq!(Race::Terran.worker(), Some(UnitType::Scv));
        assert_eq!(Race::Zerg.supply_provider(), None);
    }

    #[test]
    fn test_footprint_tile_matches_placement() {
        let site = TilePosition::new(12, 7);
        for kind in UnitType::ALL {
            let unit = UnitSnapshot::new(UnitId(1), kind, PlayerId(0), kind.center_at(site));
            assert_eq!(unit.tile(), site, "{kind}");
        }
    }

    #[test]
    fn test_default_status_is_actionable_idle() {
        let status = UnitStatus::default();
        assert!(status.exists && status.completed && status.powered && status.idle);
        assert!(!status.loaded && !status.stuck);
    }
}
