//! Configuration for DrishtiView
//!
//! Loaded from a TOML file; every section and field has a default, so an
//! empty file (or no file at all) yields a working simulated setup.
//!
//! ```toml
//! [device]
//! kind = "simulated"
//! serial_port = "/dev/ttyUSB0"
//! baud_rate = 230400
//! scan_frequency = 10.0
//!
//! [projection]
//! scale = 50.0          # pixels per meter
//!
//! [display]
//! window_size = 800
//! cancel_key = 27       # ESC
//!
//! [acquisition]
//! failure_backoff_ms = 50
//! ```

use crate::acquisition::{LoopSettings, RenderSettings};
use crate::core::sink::KeyCode;
use crate::devices::mock::config::SimulationConfig;
use crate::devices::options::LidarOptions;
use crate::error::{Error, Result};
use crate::render::compositor::FrameStyle;
use crate::render::projection::{ProjectionConfig, RasterSize};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub projection: ProjectionSection,
    pub display: DisplayConfig,
    pub acquisition: AcquisitionConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

/// Which backend to open, plus its options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Backend name (`simulated`)
    pub kind: String,
    #[serde(flatten)]
    pub options: LidarOptions,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            kind: "simulated".to_string(),
            options: LidarOptions::default(),
        }
    }
}

/// Raw projection parameters, validated into [`ProjectionConfig`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectionSection {
    /// Pixels per meter
    pub scale: f32,
    /// Pixel position of the sensor on both axes; defaults to the window center
    pub origin_offset: Option<f32>,
}

impl Default for ProjectionSection {
    fn default() -> Self {
        Self {
            scale: 50.0,
            origin_offset: None,
        }
    }
}

/// Render surface configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Square canvas side in pixels
    pub window_size: u32,
    /// Key code that ends the session
    pub cancel_key: u32,
    /// Bounded wait for input after each frame
    pub poll_timeout_ms: u64,
    /// PNG file the snapshot sink writes
    pub snapshot_path: String,
    /// Write every Nth frame
    pub snapshot_every: u32,
    pub style: FrameStyle,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_size: 800,
            cancel_key: KeyCode::ESCAPE.0,
            poll_timeout_ms: 10,
            snapshot_path: "drishti.png".to_string(),
            snapshot_every: 10,
            style: FrameStyle::default(),
        }
    }
}

/// Acquisition loop tuning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Pause after a failed fetch
    pub failure_backoff_ms: u64,
    /// Give up after this many failed fetches in a row (unset = never)
    pub max_consecutive_failures: Option<u32>,
    /// Statistics log period in seconds (0 disables)
    pub stats_interval_s: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            failure_backoff_ms: 50,
            max_consecutive_failures: None,
            stats_interval_s: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use drishti_view::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("drishti.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check every section; the first problem found is returned
    pub fn validate(&self) -> Result<()> {
        self.device.options.validate()?;
        self.projection()?;
        if self.display.window_size == 0 {
            return Err(Error::Configuration("window_size must be > 0".to_string()));
        }
        if self.display.snapshot_every == 0 {
            return Err(Error::Configuration(
                "snapshot_every must be >= 1".to_string(),
            ));
        }
        if self.acquisition.max_consecutive_failures == Some(0) {
            return Err(Error::Configuration(
                "max_consecutive_failures must be >= 1 when set".to_string(),
            ));
        }
        self.simulation.validate()?;
        Ok(())
    }

    /// Validated projection for this window
    pub fn projection(&self) -> Result<ProjectionConfig> {
        let offset = self
            .projection
            .origin_offset
            .unwrap_or(self.display.window_size as f32 / 2.0);
        ProjectionConfig::new(self.projection.scale, offset)
    }

    pub fn raster_size(&self) -> RasterSize {
        RasterSize::square(self.display.window_size)
    }

    /// Projection, canvas size and style for the acquisition loop
    pub fn render_settings(&self) -> Result<RenderSettings> {
        Ok(RenderSettings {
            projection: self.projection()?,
            size: self.raster_size(),
            style: self.display.style,
        })
    }

    /// Loop timing and stop conditions
    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            poll_timeout: Duration::from_millis(self.display.poll_timeout_ms),
            cancel_key: KeyCode(self.display.cancel_key),
            failure_backoff: Duration::from_millis(self.acquisition.failure_backoff_ms),
            max_consecutive_failures: self.acquisition.max_consecutive_failures,
            stats_interval: (self.acquisition.stats_interval_s > 0)
                .then(|| Duration::from_secs(self.acquisition.stats_interval_s)),
            max_frames: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.device.kind, "simulated");
        assert_eq!(config.display.window_size, 800);
        assert_eq!(config.display.cancel_key, 27);

        let projection = config.projection().unwrap();
        assert_eq!(projection.scale(), 50.0);
        assert_eq!(projection.origin_offset(), 400.0);
        assert_eq!(
            config.render_settings().unwrap(),
            RenderSettings::centered(800)
        );
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[device]
kind = "simulated"
serial_port = "/dev/ttyUSB1"
baud_rate = 115200
reversion = true

[projection]
scale = 80.0
origin_offset = 300.0

[display]
window_size = 600
cancel_key = 113

[display.style]
dot_radius = 2

[acquisition]
max_consecutive_failures = 25

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.device.options.serial_port, "/dev/ttyUSB1");
        assert_eq!(config.device.options.baud_rate, 115_200);
        assert!(config.device.options.reversion);
        assert_eq!(config.device.options.scan_frequency, 10.0);
        assert_eq!(config.display.window_size, 600);
        assert_eq!(config.display.style.dot_radius, 2);
        assert_eq!(config.display.style.background, [0, 0, 0]);
        assert_eq!(config.acquisition.max_consecutive_failures, Some(25));
        assert_eq!(config.acquisition.failure_backoff_ms, 50);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());

        let settings = config.loop_settings();
        assert_eq!(settings.cancel_key, KeyCode::from('q'));
        assert_eq!(settings.max_consecutive_failures, Some(25));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config: AppConfig = toml::from_str(include_str!("../drishti.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_zero_scale_rejected_at_load() {
        let config: AppConfig = toml::from_str("[projection]\nscale = 0.0\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("drishti.toml");

        let mut config = AppConfig::default();
        config.device.options.serial_port = "/dev/ttyACM0".to_string();
        config.acquisition.max_consecutive_failures = Some(5);
        config.to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AppConfig::from_file("/nonexistent/drishti.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
