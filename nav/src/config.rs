//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::policy::{DEFAULT_ARRIVAL_RADIUS_M, DEFAULT_REROUTE_THRESHOLD_M};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Routing backend configuration
    pub routing: RoutingConfig,

    /// Session behavior configuration
    pub session: SessionConfig,

    /// Simulated position source configuration
    pub simulation: SimulationConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.routing.base_url.is_empty() {
            return Err(eyre::eyre!("routing.base-url must not be empty"));
        }
        if self.routing.timeout_ms == 0 {
            return Err(eyre::eyre!("routing.timeout-ms must be positive"));
        }
        if self.session.reroute_threshold_m <= 0.0 {
            return Err(eyre::eyre!("session.reroute-threshold-m must be positive"));
        }
        if self.session.arrival_radius_m <= 0.0 {
            return Err(eyre::eyre!("session.arrival-radius-m must be positive"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .navsession.yml
        let local_config = PathBuf::from(".navsession.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/navsession/navsession.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("navsession").join("navsession.yml");
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

/// Routing backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Base URL of the Valhalla-compatible routing service
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Costing model passed to the backend
    pub costing: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://valhalla1.openstreetmap.de".to_string(),
            costing: "auto".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// How a session decides it is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionMode {
    /// Finish when a fix lands within the arrival radius of the destination
    ArrivalRadius,

    /// Finish a fixed delay after the latest route activation
    FixedDelay,
}

/// Session behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Drift from the route anchor that forces a reroute, in meters
    #[serde(rename = "reroute-threshold-m")]
    pub reroute_threshold_m: f64,

    /// How long to wait for the first position fix, in milliseconds
    #[serde(rename = "startup-timeout-ms")]
    pub startup_timeout_ms: u64,

    /// Completion detection mode
    pub completion: CompletionMode,

    /// Arrival radius around the destination, in meters
    #[serde(rename = "arrival-radius-m")]
    pub arrival_radius_m: f64,

    /// Delay after route activation before finishing, in milliseconds
    /// (only used with `completion: fixed-delay`)
    #[serde(rename = "fixed-delay-ms")]
    pub fixed_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reroute_threshold_m: DEFAULT_REROUTE_THRESHOLD_M,
            startup_timeout_ms: 15_000,
            completion: CompletionMode::ArrivalRadius,
            arrival_radius_m: DEFAULT_ARRIVAL_RADIUS_M,
            fixed_delay_ms: 10_000,
        }
    }
}

impl SessionConfig {
    /// Startup window as a Duration
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    /// Fixed completion delay as a Duration
    pub fn fixed_delay(&self) -> Duration {
        Duration::from_millis(self.fixed_delay_ms)
    }
}

/// Simulated position source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Interval between emitted fixes in milliseconds
    #[serde(rename = "interval-ms")]
    pub interval_ms: u64,

    /// Walking speed in meters per second
    #[serde(rename = "speed-mps")]
    pub speed_mps: f64,

    /// Random positional jitter applied to each fix, in meters
    #[serde(rename = "jitter-m")]
    pub jitter_m: f64,

    /// Reported accuracy of each fix, in meters
    #[serde(rename = "accuracy-m")]
    pub accuracy_m: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            speed_mps: 15.0,
            jitter_m: 3.0,
            accuracy_m: 5.0,
        }
    }
}

impl SimulationConfig {
    /// Emission interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.routing.costing, "auto");
        assert_eq!(config.session.reroute_threshold_m, 50.0);
        assert_eq!(config.session.completion, CompletionMode::ArrivalRadius);
        assert_eq!(config.simulation.interval_ms, 5_000);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
routing:
  base-url: https://valhalla.example.com
  costing: bicycle
  timeout-ms: 5000

session:
  reroute-threshold-m: 75.0
  startup-timeout-ms: 30000
  completion: fixed-delay
  fixed-delay-ms: 20000
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.routing.base_url, "https://valhalla.example.com");
        assert_eq!(config.routing.costing, "bicycle");
        assert_eq!(config.session.reroute_threshold_m, 75.0);
        assert_eq!(config.session.completion, CompletionMode::FixedDelay);
        assert_eq!(config.session.fixed_delay(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
session:
  arrival-radius-m: 15.0
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.session.arrival_radius_m, 15.0);

        // Defaults for unspecified
        assert_eq!(config.session.reroute_threshold_m, 50.0);
        assert_eq!(config.routing.costing, "auto");
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "routing:\n  costing: pedestrian").unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.routing.costing, "pedestrian");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let missing = PathBuf::from("/nonexistent/navsession.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_validate_defaults_pass() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.session.reroute_threshold_m = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.routing.base_url = String::new();
        assert!(config.validate().is_err());
    }
}
