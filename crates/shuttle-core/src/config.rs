//! Tunable parameters gathered from `constants`.
//!
//! Every struct is `#[serde(default)]`, so a JSON document only needs the
//! fields it overrides.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// FTL timing and placement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FtlConfig {
    pub startup_secs: f32,
    pub travel_secs: f32,
    pub arrival_lead_secs: f32,
    pub cooldown_secs: f32,
    pub cruise_speed: f32,
    pub staging_buffer: f32,
    pub range: f32,
    pub mass_threshold: f32,
    pub proximity_iterations: u32,
    pub spawn_spread: f32,
    pub knockdown_secs: f32,
    pub flatten_margin: f32,
}

impl Default for FtlConfig {
    fn default() -> Self {
        Self {
            startup_secs: DEFAULT_STARTUP_SECS,
            travel_secs: DEFAULT_TRAVEL_SECS,
            arrival_lead_secs: ARRIVAL_LEAD_SECS,
            cooldown_secs: FTL_COOLDOWN_SECS,
            cruise_speed: FTL_CRUISE_SPEED,
            staging_buffer: STAGING_BUFFER,
            range: FTL_RANGE,
            mass_threshold: FTL_MASS_THRESHOLD,
            proximity_iterations: FTL_PROXIMITY_ITERATIONS,
            spawn_spread: PROXIMITY_SPAWN_SPREAD,
            knockdown_secs: KNOCKDOWN_SECS,
            flatten_margin: FLATTEN_MARGIN,
        }
    }
}

impl FtlConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("startup_secs", self.startup_secs)?;
        non_negative("travel_secs", self.travel_secs)?;
        non_negative("arrival_lead_secs", self.arrival_lead_secs)?;
        non_negative("cooldown_secs", self.cooldown_secs)?;
        non_negative("knockdown_secs", self.knockdown_secs)?;
        if self.proximity_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(())
    }
}

/// Emergency shuttle call and early-launch parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyConfig {
    /// Whether console authorizations can trigger an early launch.
    pub early_launch_allowed: bool,
    pub authorizations_required: usize,
    pub authorize_secs: f32,
    pub docked_secs: f32,
    pub min_transit_secs: f32,
    pub max_transit_secs: f32,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            early_launch_allowed: true,
            authorizations_required: EMERGENCY_AUTHORIZATIONS_REQUIRED,
            authorize_secs: EMERGENCY_AUTHORIZE_SECS,
            docked_secs: EMERGENCY_DOCKED_SECS,
            min_transit_secs: EMERGENCY_MIN_TRANSIT_SECS,
            max_transit_secs: EMERGENCY_MAX_TRANSIT_SECS,
        }
    }
}

impl EmergencyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("authorize_secs", self.authorize_secs)?;
        non_negative("docked_secs", self.docked_secs)?;
        non_negative("min_transit_secs", self.min_transit_secs)?;
        non_negative("max_transit_secs", self.max_transit_secs)?;
        if self.authorizations_required == 0 {
            return Err(ConfigError::ZeroAuthorizations);
        }
        if self.min_transit_secs > self.max_transit_secs {
            return Err(ConfigError::TransitRange {
                min: self.min_transit_secs,
                max: self.max_transit_secs,
            });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value < 0.0 {
        return Err(ConfigError::NegativeDuration { field, value });
    }
    Ok(())
}
