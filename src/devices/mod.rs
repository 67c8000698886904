//! Device implementations

pub mod mock;
pub mod options;
pub mod ports;

use crate::config::AppConfig;
use crate::core::source::ScanSource;
use crate::error::{Error, Result};
use mock::SimulatedLidar;

/// Create a scan source based on configuration
pub fn create_source(config: &AppConfig) -> Result<Box<dyn ScanSource>> {
    match config.device.kind.as_str() {
        "simulated" | "mock" => {
            let source = SimulatedLidar::new(config.simulation.clone())?;
            Ok(Box::new(source))
        }
        other => Err(Error::Configuration(format!(
            "unknown device kind {:?} (available: simulated)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_simulated() {
        let config = AppConfig::default();
        let source = create_source(&config).unwrap();
        assert_eq!(source.name(), "simulated");
    }

    #[test]
    fn test_unknown_kind() {
        let mut config = AppConfig::default();
        config.device.kind = "velodyne".to_string();
        assert!(matches!(
            create_source(&config),
            Err(Error::Configuration(_))
        ));
    }
}
