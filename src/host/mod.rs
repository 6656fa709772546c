//! Boundary with the simulation host
//!
//! The agent never owns world state. Every frame it reads snapshots through
//! [`Host`], asks the host's placement and proximity queries, and sends
//! [`Command`]s back. Everything here is plain data so hosts can be swapped
//! (live game bridge, replay, or the in-memory [`sim::SimulatedHost`]).

pub mod filter;
pub mod sim;
pub mod unit;

pub use filter::UnitFilter;
pub use unit::{Role, UnitSnapshot, UnitStatus, UnitType};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{PlayerId, Position, Race, Tick, TilePosition, UnitId};
use crate::render::colors::Color;

/// Orders the agent can give a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Gather { unit: UnitId, target: UnitId },
    ReturnCargo { unit: UnitId },
    Train { unit: UnitId, kind: UnitType },
    Build { unit: UnitId, kind: UnitType, location: TilePosition },
    BuildAddon { unit: UnitId, kind: UnitType },
}

impl Command {
    /// Unit receiving the order
    pub fn unit(&self) -> UnitId {
        match self {
            Command::Gather { unit, .. }
            | Command::ReturnCargo { unit }
            | Command::Train { unit, .. }
            | Command::Build { unit, .. }
            | Command::BuildAddon { unit, .. } => *unit,
        }
    }
}

/// Frame-level status reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub frame: Tick,
    pub paused: bool,
    pub replay: bool,
    /// Frames before an issued command is processed
    pub latency_frames: u64,
}

/// Economy of the player the agent controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub race: Race,
    pub supply_used: u32,
    pub supply_total: u32,
    pub minerals: u32,
    pub gas: u32,
    pub color: Color,
}

/// Any participant in the match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub race: Race,
    pub is_observer: bool,
    pub is_neutral: bool,
}

/// Host behavior switches the agent may turn on at match start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    /// Human can type and select units while the agent runs
    UserInput,
    /// Agent sees through fog of war
    CompleteMapInformation,
}

/// State, queries and commands offered by the simulation host
pub trait Host {
    fn frame(&self) -> FrameInfo;

    /// The player under agent control, `None` when observing
    fn self_player(&self) -> Option<PlayerState>;

    /// Units owned by the controlled player
    fn own_units(&self) -> Vec<UnitSnapshot>;

    /// Every unit the agent can currently see, resources included
    fn visible_units(&self) -> Vec<UnitSnapshot>;

    fn unit(&self, id: UnitId) -> Option<UnitSnapshot>;

    fn players(&self) -> Vec<PlayerInfo>;

    /// First enemy, if any
    fn enemy(&self) -> Option<PlayerInfo>;

    fn map_name(&self) -> String;

    /// Owned units of `kind` still being built or trained
    fn incomplete_count(&self, kind: UnitType) -> usize;

    /// Placement query: a valid site for `kind` near `near`
    fn build_location(&self, kind: UnitType, near: TilePosition) -> Option<TilePosition>;

    /// Nearest visible unit matching `filter`
    fn closest_unit(&self, from: Position, filter: &UnitFilter) -> Option<UnitSnapshot> {
        self.visible_units()
            .into_iter()
            .filter(|u| filter.matches(u))
            .min_by_key(|u| OrderedFloat(from.distance(&u.position)))
    }

    /// Visible units matching `filter` within `radius` pixels of `center`
    fn units_in_radius(&self, center: Position, radius: i32, filter: &UnitFilter) -> Vec<UnitSnapshot> {
        let radius = radius as f32;
        self.visible_units()
            .into_iter()
            .filter(|u| center.distance(&u.position) <= radius && filter.matches(u))
            .collect()
    }

    /// Send an order; an error means the host refused it
    fn issue(&mut self, command: Command) -> Result<()>;

    /// Broadcast chat to every player
    fn send_text(&mut self, text: &str);

    /// Print to the local console only
    fn print(&mut self, text: &str);

    fn set_command_optimization_level(&mut self, level: u8);

    fn enable_flag(&mut self, flag: Flag);
}
