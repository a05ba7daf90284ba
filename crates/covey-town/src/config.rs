//! Town settings and registry configuration.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default maximum occupancy advertised for a town.
pub const DEFAULT_CAPACITY: usize = 50;

/// Default command channel size for town actors.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

// ---------------------------------------------------------------------------
// TownConfig
// ---------------------------------------------------------------------------

/// The mutable metadata of a single town.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownConfig {
    /// Display name shown in the town list.
    pub friendly_name: String,

    /// Whether the town appears in public listings.
    pub is_publicly_listed: bool,

    /// Maximum occupancy advertised to clients. Informational; joins are
    /// not refused when it is exceeded.
    pub capacity: usize,
}

impl TownConfig {
    pub fn new(friendly_name: impl Into<String>, is_publicly_listed: bool) -> Self {
        Self {
            friendly_name: friendly_name.into(),
            is_publicly_listed,
            ..Self::default()
        }
    }
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            friendly_name: String::new(),
            is_publicly_listed: false,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

// ---------------------------------------------------------------------------
// TownManagerConfig
// ---------------------------------------------------------------------------

/// Settings for the town registry.
///
/// Loaded from environment variables with sensible defaults:
///
/// | Variable              | Field            | Default |
/// |-----------------------|------------------|---------|
/// | `COVEY_TOWN_CAPACITY` | `default_capacity` | 50    |
/// | `COVEY_CHANNEL_SIZE`  | `channel_size`   | 64      |
/// | `DEMO_TOWN_ID`        | `demo_town_id`   | unset   |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TownManagerConfig {
    /// Capacity given to newly created towns.
    pub default_capacity: usize,

    /// Command channel size for each town actor.
    pub channel_size: usize,

    /// A town created with exactly this friendly name gets it as its id,
    /// so a well-known demo town can be reached by a stable URL.
    pub demo_town_id: Option<String>,
}

impl Default for TownManagerConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
            channel_size: DEFAULT_CHANNEL_SIZE,
            demo_town_id: None,
        }
    }
}

impl TownManagerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_capacity = parse_positive(vars, "COVEY_TOWN_CAPACITY")?
            .unwrap_or(defaults.default_capacity);
        let channel_size =
            parse_positive(vars, "COVEY_CHANNEL_SIZE")?.unwrap_or(defaults.channel_size);
        let demo_town_id = vars
            .get("DEMO_TOWN_ID")
            .filter(|v| !v.is_empty())
            .cloned();

        Ok(Self {
            default_capacity,
            channel_size,
            demo_town_id,
        })
    }
}

fn parse_positive(
    vars: &HashMap<String, String>,
    name: &'static str,
) -> Result<Option<usize>, ConfigError> {
    let Some(raw) = vars.get(name) else {
        return Ok(None);
    };
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.clone(),
        }),
    }
}
