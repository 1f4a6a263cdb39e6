//! Configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hold::{HoldKind, HoldTimings};

/// Main fieldops configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hold-to-confirm timing
    pub hold: HoldConfig,

    /// Document store location
    pub storage: StorageConfig,

    /// Feedback pulses
    pub feedback: FeedbackConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear messages.
    pub fn validate(&self) -> Result<()> {
        for (label, duration) in [
            ("start-hold-ms", self.hold.start_hold_ms),
            ("terminate-hold-ms", self.hold.terminate_hold_ms),
            ("transfer-hold-ms", self.hold.transfer_hold_ms),
        ] {
            if duration == 0 {
                return Err(eyre::eyre!("{} must be greater than zero", label));
            }
            if self.hold.tick_ms >= duration {
                return Err(eyre::eyre!(
                    "tick-ms ({}) must be shorter than {} ({})",
                    self.hold.tick_ms,
                    label,
                    duration
                ));
            }
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .fieldops.yml
        let local_config = PathBuf::from(".fieldops.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/fieldops/fieldops.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("fieldops").join("fieldops.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Hold-to-confirm timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldConfig {
    /// Hold duration for starting an intervention, in milliseconds
    #[serde(rename = "start-hold-ms", default = "default_start_hold_ms")]
    pub start_hold_ms: u64,

    /// Hold duration for terminating an intervention
    #[serde(rename = "terminate-hold-ms", default = "default_terminate_hold_ms")]
    pub terminate_hold_ms: u64,

    /// Hold duration for beginning a transfer
    #[serde(rename = "transfer-hold-ms", default = "default_transfer_hold_ms")]
    pub transfer_hold_ms: u64,

    /// Safety timer fires this much after the hold duration
    #[serde(rename = "safety-margin-ms", default = "default_safety_margin_ms")]
    pub safety_margin_ms: u64,

    /// Progress update interval
    #[serde(rename = "tick-ms", default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Progress decay time after an early release
    #[serde(rename = "decay-ms", default = "default_decay_ms")]
    pub decay_ms: u64,
}

impl HoldConfig {
    /// Timings for one action's controller
    pub fn timings_for(&self, kind: HoldKind) -> HoldTimings {
        let duration_ms = match kind {
            HoldKind::Start => self.start_hold_ms,
            HoldKind::Terminate => self.terminate_hold_ms,
            HoldKind::Transfer => self.transfer_hold_ms,
        };
        HoldTimings::from_millis(duration_ms, self.safety_margin_ms, self.tick_ms, self.decay_ms)
    }

    /// Uniformly scaled timings, used by the CLI simulator
    pub fn scaled(&self, factor: u64) -> Self {
        let factor = factor.max(1);
        Self {
            start_hold_ms: (self.start_hold_ms / factor).max(1),
            terminate_hold_ms: (self.terminate_hold_ms / factor).max(1),
            transfer_hold_ms: (self.transfer_hold_ms / factor).max(1),
            safety_margin_ms: (self.safety_margin_ms / factor).max(1),
            tick_ms: (self.tick_ms / factor).max(1),
            decay_ms: (self.decay_ms / factor).max(1),
        }
    }
}

fn default_start_hold_ms() -> u64 {
    3000
}

fn default_terminate_hold_ms() -> u64 {
    2000
}

fn default_transfer_hold_ms() -> u64 {
    2500
}

fn default_safety_margin_ms() -> u64 {
    100
}

fn default_tick_ms() -> u64 {
    16
}

fn default_decay_ms() -> u64 {
    200
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            start_hold_ms: default_start_hold_ms(),
            terminate_hold_ms: default_terminate_hold_ms(),
            transfer_hold_ms: default_transfer_hold_ms(),
            safety_margin_ms: default_safety_margin_ms(),
            tick_ms: default_tick_ms(),
            decay_ms: default_decay_ms(),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store snapshot path; defaults to the platform data dir
    #[serde(rename = "data-path", default)]
    pub data_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolved snapshot path
    pub fn resolved_path(&self) -> PathBuf {
        self.data_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("fieldops")
                .join("store.json")
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_path: None }
    }
}

/// Feedback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Whether pulses are emitted at all
    #[serde(default = "default_feedback_enabled")]
    pub enabled: bool,
}

fn default_feedback_enabled() -> bool {
    true
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: default_feedback_enabled(),
        }
    }
}
