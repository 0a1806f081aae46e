//! Error types.

use thiserror::Error;

/// Why a shuttle may not start FTL right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelDenied {
    #[error("shuttle is already in FTL")]
    InTransit,
    #[error("FTL drive is cooling down")]
    CoolingDown,
    #[error("grid is not a shuttle")]
    NotAShuttle,
    #[error("a nearby grid is too close to jump")]
    Proximity,
    #[error("destination is unavailable")]
    DestinationUnavailable,
    #[error("shuttle is not cleared for that destination")]
    NotWhitelisted,
    #[error("cannot travel to itself")]
    SelfTarget,
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must not be negative (got {value})")]
    NegativeDuration { field: &'static str, value: f32 },
    #[error("proximity search needs at least one iteration")]
    ZeroIterations,
    #[error("emergency shuttle needs at least one authorization")]
    ZeroAuthorizations,
    #[error("minimum transit time {min} exceeds maximum {max}")]
    TransitRange { min: f32, max: f32 },
}
