//! ScanSource trait definition

use crate::core::types::Scan;
use crate::devices::options::LidarOptions;
use crate::error::Result;

/// Rangefinder device abstraction consumed by the acquisition loop
///
/// Lifecycle: `configure` → `start` → `fetch_scan`* → `stop` → `disconnect`.
/// Implementations own their device handle; the loop never shares it.
pub trait ScanSource: Send {
    /// Short device name for logs
    fn name(&self) -> &str;

    /// Apply device options
    ///
    /// Rejection carries a human-readable diagnostic in
    /// [`Error::Configuration`](crate::error::Error::Configuration).
    fn configure(&mut self, options: &LidarOptions) -> Result<()>;

    /// Spin up the device and begin scanning
    fn start(&mut self) -> Result<()>;

    /// Block until the next full revolution, bounded by the device timeout
    fn fetch_scan(&mut self) -> Result<Scan>;

    /// Stop scanning (motor off). Must be safe to call more than once.
    fn stop(&mut self) -> Result<()>;

    /// Release the device handle. Must be safe to call more than once.
    fn disconnect(&mut self) -> Result<()>;

    /// Mounting pitch in degrees, for devices that report one
    fn pitch_angle(&mut self) -> Option<f32> {
        None
    }
}

impl<S: ScanSource + ?Sized> ScanSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn configure(&mut self, options: &LidarOptions) -> Result<()> {
        (**self).configure(options)
    }

    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn fetch_scan(&mut self) -> Result<Scan> {
        (**self).fetch_scan()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect()
    }

    fn pitch_angle(&mut self) -> Option<f32> {
        (**self).pitch_angle()
    }
}
