//! Color definitions for players and overlays

use serde::{Deserialize, Serialize};

/// RGBA color (0.0 to 1.0 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Darken color by a factor (0.0 = black, 1.0 = unchanged)
    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }
}

pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Slot colors in player order
const PLAYER_PALETTE: [Color; 8] = [
    Color::new(0.96, 0.10, 0.10, 1.0), // Red
    Color::new(0.05, 0.30, 0.85, 1.0), // Blue
    Color::new(0.10, 0.65, 0.60, 1.0), // Teal
    Color::new(0.50, 0.25, 0.70, 1.0), // Purple
    Color::new(0.95, 0.55, 0.10, 1.0), // Orange
    Color::new(0.40, 0.20, 0.05, 1.0), // Brown
    Color::new(0.90, 0.90, 0.90, 1.0), // White
    Color::new(0.95, 0.95, 0.20, 1.0), // Yellow
];

/// Default color for a player slot
pub fn player_color(slot: u8) -> Color {
    PLAYER_PALETTE[slot as usize % PLAYER_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps() {
        assert_eq!(player_color(0), player_color(8));
        assert_ne!(player_color(0), player_color(1));
    }

    #[test]
    fn test_darken_keeps_alpha() {
        let c = WHITE.darken(0.5);
        assert_eq!(c.r, 0.5);
        assert_eq!(c.a, 1.0);
    }
}
