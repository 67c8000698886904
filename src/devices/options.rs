//! Typed lidar device options
//!
//! Replaces a heterogeneous key/value option bag with named fields that are
//! validated once, before any of them reach a device.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Baud rates accepted by triangle/TOF rangefinder UARTs
pub const SUPPORTED_BAUD_RATES: [u32; 7] = [
    115_200, 128_000, 150_000, 153_600, 230_400, 460_800, 512_000,
];

/// Ranging principle of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LidarType {
    /// Triangulation (Tmini, X2, G-series)
    #[default]
    Triangle,
    /// Time of flight
    Tof,
    /// Network TOF variants
    Tea,
}

/// Physical link to the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// UART / USB-serial adapter
    #[default]
    Serial,
    /// TCP socket
    Tcp,
    /// UDP socket
    Udp,
}

/// Complete device option set
///
/// Angles are in degrees, ranges in meters, frequency in Hz.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LidarOptions {
    /// Serial port path; empty means "discover"
    pub serial_port: String,
    /// Comma-separated angle pairs to blank out, e.g. "-90,-80,30,40"
    pub ignore_array: String,
    pub baud_rate: u32,
    pub lidar_type: LidarType,
    pub device_type: DeviceType,
    /// Sample rate in kHz
    pub sample_rate: u8,
    pub intensity_bits: u8,
    pub min_angle: f32,
    pub max_angle: f32,
    pub min_range: f32,
    pub max_range: f32,
    pub scan_frequency: f32,
    pub fixed_resolution: bool,
    pub reversion: bool,
    pub inverted: bool,
    pub auto_reconnect: bool,
    pub single_channel: bool,
    pub intensity: bool,
    pub support_motor_dtr_ctrl: bool,
    pub support_heartbeat: bool,
    pub glass_noise_filter: bool,
    pub sun_noise_filter: bool,
}

impl LidarOptions {
    /// Defaults for a Tmini Plus on a USB adapter
    pub fn tmini_defaults() -> Self {
        let single_channel = false;
        Self {
            serial_port: String::new(),
            ignore_array: String::new(),
            baud_rate: 230_400,
            lidar_type: LidarType::Triangle,
            device_type: DeviceType::Serial,
            sample_rate: if single_channel { 3 } else { 4 },
            intensity_bits: 8,
            min_angle: -180.0,
            max_angle: 180.0,
            min_range: 0.05,
            max_range: 64.0,
            scan_frequency: 10.0,
            fixed_resolution: true,
            reversion: false,
            inverted: false,
            auto_reconnect: true,
            single_channel,
            intensity: true,
            support_motor_dtr_ctrl: false,
            support_heartbeat: false,
            glass_noise_filter: false,
            sun_noise_filter: false,
        }
    }

    /// Check every option against the device's accepted ranges
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(Error::Configuration(format!(
                "unsupported baud rate {} (expected one of {:?})",
                self.baud_rate, SUPPORTED_BAUD_RATES
            )));
        }
        if self.sample_rate == 0 || self.sample_rate > 20 {
            return Err(Error::Configuration(format!(
                "sample rate {} kHz out of range 1..=20",
                self.sample_rate
            )));
        }
        if self.intensity && !(1..=16).contains(&self.intensity_bits) {
            return Err(Error::Configuration(format!(
                "intensity bit depth {} out of range 1..=16",
                self.intensity_bits
            )));
        }
        if !(-180.0..=180.0).contains(&self.min_angle)
            || !(-180.0..=180.0).contains(&self.max_angle)
            || self.min_angle >= self.max_angle
        {
            return Err(Error::Configuration(format!(
                "invalid angle window [{}, {}] degrees",
                self.min_angle, self.max_angle
            )));
        }
        if !self.min_range.is_finite()
            || !self.max_range.is_finite()
            || self.min_range < 0.0
            || self.min_range >= self.max_range
        {
            return Err(Error::Configuration(format!(
                "invalid range window [{}, {}] m",
                self.min_range, self.max_range
            )));
        }
        if !(self.scan_frequency > 0.0 && self.scan_frequency <= 50.0) {
            return Err(Error::Configuration(format!(
                "scan frequency {} Hz out of range (0, 50]",
                self.scan_frequency
            )));
        }
        self.ignore_ranges()?;
        Ok(())
    }

    /// Parse `ignore_array` into (start, end) degree pairs
    pub fn ignore_ranges(&self) -> Result<Vec<(f32, f32)>> {
        let trimmed = self.ignore_array.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let values = trimmed
            .split(',')
            .map(|v| {
                v.trim().parse::<f32>().map_err(|e| {
                    Error::Configuration(format!("ignore_array value {:?}: {}", v.trim(), e))
                })
            })
            .collect::<Result<Vec<f32>>>()?;

        if values.len() % 2 != 0 {
            return Err(Error::Configuration(
                "ignore_array must contain an even number of angles".to_string(),
            ));
        }

        Ok(values.chunks(2).map(|pair| (pair[0], pair[1])).collect())
    }

    /// Expected samples per revolution at the configured rates
    pub fn samples_per_revolution(&self) -> usize {
        (self.sample_rate as f32 * 1000.0 / self.scan_frequency).round() as usize
    }
}

impl Default for LidarOptions {
    fn default() -> Self {
        Self::tmini_defaults()
    }
}
