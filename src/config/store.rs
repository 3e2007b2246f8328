//! Store and loyalty settings loaded from config.toml
//!
//! Every section is optional. A missing file yields the defaults used by
//! Ferragens Natal: 500 points per milestone, R$ 10.00 bonus per milestone,
//! and local time at UTC-3.

use crate::core::loyalty::LoyaltyRules;
use crate::errors::{Error, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Store identity and locale
    #[serde(default)]
    pub store: StoreSettings,
    /// Points to bonus conversion rules
    #[serde(default)]
    pub loyalty: LoyaltySettings,
}

/// Store identity printed on receipts and reports
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Name printed at the top of receipts
    #[serde(default = "default_store_name")]
    pub name: String,
    /// Offset of the store's local time from UTC, in whole hours
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

/// Milestone conversion as written in config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct LoyaltySettings {
    /// Points that make up one milestone
    #[serde(default = "default_points_per_milestone")]
    pub points_per_milestone: i64,
    /// Bonus granted per milestone, in reais
    #[serde(default = "default_bonus_per_milestone")]
    pub bonus_per_milestone: f64,
}

impl Default for LoyaltySettings {
    fn default() -> Self {
        Self {
            points_per_milestone: default_points_per_milestone(),
            bonus_per_milestone: default_bonus_per_milestone(),
        }
    }
}

fn default_store_name() -> String {
    "FERRAGENS NATAL".to_string()
}

const fn default_utc_offset_hours() -> i32 {
    -3
}

const fn default_points_per_milestone() -> i64 {
    500
}

const fn default_bonus_per_milestone() -> f64 {
    10.0
}

impl Config {
    /// Fixed offset used for "today" and for printed timestamps.
    ///
    /// # Errors
    /// Returns `Error::Config` when the offset is outside ±23 hours.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.store.utc_offset_hours * 3600).ok_or_else(|| Error::Config {
            message: format!(
                "utc_offset_hours must be between -23 and 23, got {}",
                self.store.utc_offset_hours
            ),
        })
    }

    /// Validated loyalty rules.
    ///
    /// # Errors
    /// Returns `Error::Config` when the milestone size or bonus is not positive.
    pub fn loyalty_rules(&self) -> Result<LoyaltyRules> {
        LoyaltyRules::new(
            self.loyalty.points_per_milestone,
            self.loyalty.bonus_per_milestone,
        )
    }
}

/// Loads store configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from {}", path_ref.display());
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads configuration from `PONTOS_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: defaults are used and a warning is logged.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("PONTOS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        warn!("No configuration file at {path}, using built-in defaults");
        return Ok(Config::default());
    }
    load_config(path)
}
