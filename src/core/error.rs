use thiserror::Error;

use crate::host::Command;

/// Why the host refused a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RejectReason {
    InsufficientMinerals,
    SupplyBlocked,
    UnitBusy,
    UnknownUnit,
    InvalidTarget,
    InvalidLocation,
    IncapableUnit,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RejectReason::InsufficientMinerals => "insufficient minerals",
            RejectReason::SupplyBlocked => "insufficient supply",
            RejectReason::UnitBusy => "unit busy",
            RejectReason::UnknownUnit => "unit does not exist",
            RejectReason::InvalidTarget => "invalid target",
            RejectReason::InvalidLocation => "invalid build location",
            RejectReason::IncapableUnit => "unit cannot perform this command",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Command {command:?} rejected: {reason}")]
    CommandRejected { command: Command, reason: RejectReason },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Presentation error: {0}")]
    Presentation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl AgentError {
    /// Rejection reason, if the host refused a command
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            AgentError::CommandRejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
