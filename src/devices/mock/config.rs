//! Simulated rangefinder configuration
//!
//! ```text
//! SimulationConfig
//! ├── room_width/height, sensor_x/y     # Environment
//! ├── obstacle_x/y/radius               # Single round obstacle
//! ├── spin_rate                         # Sensor yaw drift (rad/s)
//! ├── failure_rate, random_seed         # Fault injection
//! └── SimNoiseConfig                    # Measurement noise
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Noise configuration for simulated returns
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimNoiseConfig {
    /// Range noise standard deviation (meters)
    pub range_stddev: f32,
    /// Angular noise standard deviation (radians)
    pub angle_stddev: f32,
    /// Probability of a dropped return (0.0-1.0)
    pub miss_rate: f32,
    /// Probability of a sun-glare spike when the sun filter is off
    pub sun_spike_rate: f32,
    /// Probability of a glass ghost return when the glass filter is off
    pub glass_ghost_rate: f32,
}

impl Default for SimNoiseConfig {
    fn default() -> Self {
        Self {
            range_stddev: 0.01,
            angle_stddev: 0.001,
            miss_rate: 0.01,
            sun_spike_rate: 0.005,
            glass_ghost_rate: 0.005,
        }
    }
}

/// Environment and fault model for [`SimulatedLidar`](super::SimulatedLidar)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Room extent along x (meters), walls at 0 and width
    pub room_width: f32,
    /// Room extent along y (meters), walls at 0 and height
    pub room_height: f32,
    pub sensor_x: f32,
    pub sensor_y: f32,
    pub obstacle_x: f32,
    pub obstacle_y: f32,
    /// Obstacle radius in meters; 0 disables it
    pub obstacle_radius: f32,
    /// Sensor yaw rate in rad/s, makes the view slowly rotate
    pub spin_rate: f32,
    /// Probability that a fetch fails outright (0.0-1.0)
    pub failure_rate: f32,
    /// Seed for reproducible noise; 0 draws from entropy
    pub random_seed: u64,
    /// Pace revolutions at the configured scan frequency
    pub realtime: bool,
    /// Mounting pitch reported to the host, degrees
    pub pitch_angle: f32,
    pub noise: SimNoiseConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            room_width: 8.0,
            room_height: 6.0,
            sensor_x: 3.0,
            sensor_y: 2.5,
            obstacle_x: 5.5,
            obstacle_y: 4.0,
            obstacle_radius: 0.4,
            spin_rate: 0.1,
            failure_rate: 0.0,
            random_seed: 0,
            realtime: true,
            pitch_angle: 0.0,
            noise: SimNoiseConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Reject geometry that would put the sensor outside the room
    pub fn validate(&self) -> Result<()> {
        if !(self.room_width > 0.0 && self.room_height > 0.0) {
            return Err(Error::Configuration(format!(
                "simulation room {}x{} m must be positive",
                self.room_width, self.room_height
            )));
        }
        if !(self.sensor_x > 0.0
            && self.sensor_x < self.room_width
            && self.sensor_y > 0.0
            && self.sensor_y < self.room_height)
        {
            return Err(Error::Configuration(format!(
                "simulated sensor ({}, {}) lies outside the room",
                self.sensor_x, self.sensor_y
            )));
        }
        let rates = [
            ("failure_rate", self.failure_rate),
            ("noise.miss_rate", self.noise.miss_rate),
            ("noise.sun_spike_rate", self.noise.sun_spike_rate),
            ("noise.glass_ghost_rate", self.noise.glass_ghost_rate),
        ];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::Configuration(format!(
                    "{} = {} is not a probability",
                    name, rate
                )));
            }
        }
        if self.obstacle_radius < 0.0 {
            return Err(Error::Configuration(
                "obstacle_radius must be >= 0".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.pitch_angle) {
            return Err(Error::Configuration(format!(
                "pitch_angle {} outside [-90, 90] degrees",
                self.pitch_angle
            )));
        }
        Ok(())
    }

    /// Noise-free, failure-free, unpaced simulation for tests
    pub fn deterministic() -> Self {
        Self {
            spin_rate: 0.0,
            random_seed: 42,
            realtime: false,
            noise: SimNoiseConfig {
                range_stddev: 0.0,
                angle_stddev: 0.0,
                miss_rate: 0.0,
                sun_spike_rate: 0.0,
                glass_ghost_rate: 0.0,
            },
            ..Self::default()
        }
    }
}
