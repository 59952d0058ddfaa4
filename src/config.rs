//! Engine defaults and layered configuration loading.
//!
//! Settings come from (lowest to highest precedence) built-in defaults, an
//! optional `pricewatch.{toml,yaml,json}` in the platform config directory,
//! an optional `config/pricewatch` file in the working directory, and
//! `PRICEWATCH__*` environment variables (a `.env` file is honoured).

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{PriceError, Result};

pub const DEFAULT_REFERENCE_TIMEZONE: &str = "Europe/Rome";
pub const DEFAULT_STALENESS_HOURS: i64 = 48;
pub const DEFAULT_RECENT_HIGH_DAYS: u32 = 90;
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 30;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

/// Allowed cache TTL range. Anything longer would outlive the scrape interval.
pub const CACHE_TTL_MINUTES_RANGE: std::ops::RangeInclusive<u64> = 15..=60;

pub const OBSERVATIONS_TABLE: &str = "price_observations";
pub const PRODUCTS_TABLE: &str = "products";

/// Tunables for a [`PriceEngine`](crate::PriceEngine).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// IANA timezone whose calendar days define daily buckets.
    pub reference_timezone: String,
    /// Maximum age of an observation for it to count as a current price.
    pub staleness_hours: i64,
    /// Days of new-market history that define the "recent high".
    pub recent_high_days: u32,
    /// Rollup cache TTL. `None` disables caching.
    pub cache_ttl_minutes: Option<u64>,
    /// Upper bound on a single store read.
    pub store_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reference_timezone: DEFAULT_REFERENCE_TIMEZONE.to_string(),
            staleness_hours: DEFAULT_STALENESS_HOURS,
            recent_high_days: DEFAULT_RECENT_HIGH_DAYS,
            cache_ttl_minutes: Some(DEFAULT_CACHE_TTL_MINUTES),
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
        }
    }
}

impl EngineSettings {
    /// Load settings from config files and the environment, then validate them.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(path) = default_config_file() {
            builder = builder.add_source(File::with_name(&path.to_string_lossy()).required(false));
        }
        let settings: EngineSettings = builder
            .add_source(File::with_name("config/pricewatch").required(false))
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::debug!(settings = %settings, "Loaded engine settings");
        Ok(settings)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        self.reference_tz()?;
        if self.staleness_hours <= 0 {
            return Err(PriceError::InvalidArgument(format!(
                "staleness_hours must be positive, got {}",
                self.staleness_hours
            )));
        }
        if !(1..=90).contains(&self.recent_high_days) {
            return Err(PriceError::InvalidArgument(format!(
                "recent_high_days must be within 1..=90, got {}",
                self.recent_high_days
            )));
        }
        if let Some(ttl) = self.cache_ttl_minutes {
            if !CACHE_TTL_MINUTES_RANGE.contains(&ttl) {
                return Err(PriceError::InvalidArgument(format!(
                    "cache_ttl_minutes must be within 15..=60, got {}",
                    ttl
                )));
            }
        }
        if self.store_timeout_ms == 0 {
            return Err(PriceError::InvalidArgument(
                "store_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn reference_tz(&self) -> Result<Tz> {
        self.reference_timezone.parse::<Tz>().map_err(|_| {
            PriceError::InvalidArgument(format!(
                "Unknown reference timezone: {}",
                self.reference_timezone
            ))
        })
    }

    pub fn staleness(&self) -> chrono::Duration {
        chrono::Duration::hours(self.staleness_hours)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_minutes.map(|m| Duration::from_secs(m * 60))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl std::fmt::Display for EngineSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tz={} staleness={}h recent_high={}d cache_ttl={} store_timeout={}ms",
            self.reference_timezone,
            self.staleness_hours,
            self.recent_high_days,
            self.cache_ttl_minutes
                .map(|m| format!("{}m", m))
                .unwrap_or_else(|| "off".to_string()),
            self.store_timeout_ms
        )
    }
}

/// `<platform config dir>/pricewatch/pricewatch`, extension resolved by the `config` crate.
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pricewatch").join("pricewatch"))
}
