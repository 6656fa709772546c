//! Core type definitions used throughout the codebase

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Pixels per build tile
pub const TILE_SIZE: i32 = 32;

/// Host-assigned handle for a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, From, Display)]
#[display(fmt = "unit#{}", _0)]
pub struct UnitId(pub u32);

/// Host-assigned handle for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, From, Display)]
#[display(fmt = "player#{}", _0)]
pub struct PlayerId(pub u8);

/// Game tick counter (simulation time unit, one host frame)
pub type Tick = u64;

/// Position in pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Tile containing this position
    pub fn to_tile(self) -> TilePosition {
        TilePosition::new(
            self.x.div_euclid(TILE_SIZE),
            self.y.div_euclid(TILE_SIZE),
        )
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position on the build-tile grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
}

impl TilePosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Top-left pixel of this tile
    pub fn to_position(self) -> Position {
        Position::new(self.x * TILE_SIZE, self.y * TILE_SIZE)
    }

    /// Pixel center of this tile
    pub fn center(self) -> Position {
        Position::new(
            self.x * TILE_SIZE + TILE_SIZE / 2,
            self.y * TILE_SIZE + TILE_SIZE / 2,
        )
    }
}

impl std::ops::Add for TilePosition {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for TilePosition {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::fmt::Display for TilePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Playable race of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Race {
    Terran,
    Zerg,
    Protoss,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_round_trip_through_position() {
        let tile = TilePosition::new(7, 3);
        assert_eq!(tile.to_position(), Position::new(224, 96));
        assert_eq!(tile.to_position().to_tile(), tile);
        assert_eq!(tile.center().to_tile(), tile);
    }

    #[test]
    fn test_negative_pixels_floor_to_tile() {
        assert_eq!(Position::new(-1, -33).to_tile(), TilePosition::new(-1, -2));
    }

    #[test]
    fn test_position_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(30, 40);
        assert!((a.distance(&b) - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_tile_arithmetic() {
        let a = TilePosition::new(10, 10);
        let size = TilePosition::new(3, 2);
        assert_eq!(a + size, TilePosition::new(13, 12));
        assert_eq!((a + size) - a, size);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UnitId(12).to_string(), "unit#12");
        assert_eq!(PlayerId::from(3).to_string(), "player#3");
        assert_eq!(Race::Terran.to_string(), "Terran");
    }
}
