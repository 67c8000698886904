//! Error types for DrishtiView

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// DrishtiView error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected configuration or device option (fatal before scanning starts)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single scan fetch failed
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    /// Device did not deliver a revolution within its timeout
    #[error("Scan timeout")]
    Timeout,

    /// Device used before it was configured and started
    #[error("Device not initialized")]
    NotInitialized,

    /// Device stop or disconnect failed
    #[error("Teardown failed: {0}")]
    Teardown(String),

    /// Render surface failure
    #[error("Display error: {0}")]
    Display(String),

    /// Too many fetch failures in a row
    #[error("Device lost after {consecutive} consecutive failed scans")]
    DeviceLost {
        /// Failures observed without an intervening good scan
        consecutive: u32,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port enumeration error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Config serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Recoverable errors never unwind past one loop iteration.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Acquisition(_) | Error::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Timeout.is_transient());
        assert!(Error::Acquisition("crc".into()).is_transient());
        assert!(!Error::Configuration("baud".into()).is_transient());
        assert!(!Error::Teardown("stop".into()).is_transient());
        assert!(!Error::DeviceLost { consecutive: 3 }.is_transient());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::DeviceLost { consecutive: 7 };
        assert_eq!(
            err.to_string(),
            "Device lost after 7 consecutive failed scans"
        );
        let err = Error::Configuration("scale must be > 0".into());
        assert_eq!(err.to_string(), "Configuration error: scale must be > 0");
    }
}
