//! Agent configuration with documented constants
//!
//! All tuning numbers used by the behaviors are collected here with
//! explanations of their purpose and how they interact with each other.
//! None of them is a protocol requirement; every value can be overridden
//! from a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{AgentError, Result};
use crate::host::UnitType;

/// Supply (population capacity) management
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyConfig {
    /// Fraction of total supply above which a new provider is planned
    ///
    /// At 0.85 a 100-supply base starts a depot once 86 supply is in use,
    /// leaving room for the depot's build time.
    pub threshold: f64,

    /// Minimum ticks between two supply provider decisions
    ///
    /// 400 frames is a bit more than half a depot's build time, so a
    /// second depot can be started while the first finishes if supply
    /// keeps climbing.
    pub check_interval: u64,

    /// Extra ticks a build-site highlight stays scheduled past build time
    pub highlight_grace: u64,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            check_interval: 400,
            highlight_grace: 100,
        }
    }
}

/// Worker saturation around a production hub
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Radius (pixels) in which resource nodes count toward a hub
    pub resource_radius: i32,

    /// Radius (pixels) in which workers count toward a hub
    ///
    /// Larger than `resource_radius` to account for the base footprint:
    /// workers walking to and from the patches are still "at" the base.
    pub worker_radius: i32,

    /// Desired workers per mineral patch
    pub per_mineral_field: u32,

    /// Desired workers per refinery
    pub per_refinery: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            resource_radius: 250,
            worker_radius: 750,
            per_mineral_field: 3,
            per_refinery: 4,
        }
    }
}

/// Secondary production buildings planned by a hub
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Structure kind to construct
    pub building: UnitType,

    /// Maximum number of these buildings the hub will order
    pub max_buildings: u32,

    /// Minimum ticks between two expansion decisions
    pub check_interval: u64,

    /// Worker count that must be exceeded before expanding
    pub min_workers: usize,

    /// Extra ticks a build-site highlight stays scheduled past build time
    pub highlight_grace: u64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            building: UnitType::Barracks,
            max_buildings: 3,
            check_interval: 400,
            min_workers: 9,
            highlight_grace: 100,
        }
    }
}

/// What secondary producers make
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    /// Unit trained whenever the producer is idle
    pub trains: UnitType,

    /// Add-on built when the host refuses the training order
    ///
    /// `None` disables the fallback.
    pub fallback_addon: Option<UnitType>,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            trains: UnitType::Marine,
            fallback_addon: Some(UnitType::Marine),
        }
    }
}

/// Host flags applied when a match starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSetupConfig {
    /// Host command grouping level (0 disables grouping)
    ///
    /// Level 2 lets the host merge identical orders issued on the same
    /// frame, which keeps the action rate down.
    pub command_optimization_level: u8,

    /// Request full map information (ignores fog of war)
    pub complete_map_information: bool,

    /// Allow a human to type and control units alongside the agent
    pub user_input: bool,

    /// Host frames per game second, for replay timestamps
    pub frames_per_second: u64,

    /// Chat line sent when the match starts
    pub greeting: String,
}

impl Default for MatchSetupConfig {
    fn default() -> Self {
        Self {
            command_optimization_level: 2,
            complete_map_information: true,
            user_input: true,
            frames_per_second: 24,
            greeting: "Hello world!".to_string(),
        }
    }
}

/// Complete agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub supply: SupplyConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
    #[serde(default)]
    pub expansion: ExpansionConfig,
    #[serde(default)]
    pub production: ProductionConfig,
    #[serde(default)]
    pub match_setup: MatchSetupConfig,
}

impl AgentConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AgentConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.supply.threshold > 0.0 && self.supply.threshold <= 1.0) {
            return Err(AgentError::Config(format!(
                "supply.threshold ({}) must be in (0, 1]",
                self.supply.threshold
            )));
        }

        if self.workers.resource_radius <= 0 || self.workers.worker_radius <= 0 {
            return Err(AgentError::Config("scan radii must be positive".into()));
        }

        if self.workers.worker_radius < self.workers.resource_radius {
            return Err(AgentError::Config(format!(
                "workers.worker_radius ({}) should be >= workers.resource_radius ({})",
                self.workers.worker_radius, self.workers.resource_radius
            )));
        }

        if !self.expansion.building.is_building() {
            return Err(AgentError::Config(format!(
                "expansion.building ({:?}) is not a structure",
                self.expansion.building
            )));
        }

        if self.match_setup.frames_per_second == 0 {
            return Err(AgentError::Config("match_setup.frames_per_second must be positive".into()));
        }

        Ok(())
    }
}

/// Load and validate a configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<AgentConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    AgentConfig::from_toml_str(&contents)
}
