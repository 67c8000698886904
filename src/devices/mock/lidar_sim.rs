//! Rangefinder simulator with ray-casting
//!
//! Produces revolutions as a sensor standing in a rectangular room with one
//! round obstacle would see them, shaped by the device options the same way
//! firmware shapes real output (angle window, range window, intensity depth,
//! orientation flags, noise filters).

use super::config::SimulationConfig;
use super::noise::NoiseGenerator;
use crate::core::types::{Sample, Scan};
use crate::devices::options::LidarOptions;
use std::f32::consts::{PI, TAU};

/// Slack for degree/radian round-off at the angle window edges
const ANGLE_TOLERANCE: f32 = 1e-4;

/// Static environment: walls plus an optional round obstacle
#[derive(Debug, Clone)]
pub struct Room {
    width: f32,
    height: f32,
    obstacle: Option<(f32, f32, f32)>,
}

impl Room {
    pub fn from_config(config: &SimulationConfig) -> Self {
        let obstacle = (config.obstacle_radius > 0.0).then_some((
            config.obstacle_x,
            config.obstacle_y,
            config.obstacle_radius,
        ));
        Self {
            width: config.room_width,
            height: config.room_height,
            obstacle,
        }
    }

    /// Distance from (x, y) along `angle` to the first surface
    pub fn ray_cast(&self, x: f32, y: f32, angle: f32) -> f32 {
        let (dy, dx) = angle.sin_cos();

        let tx = if dx > f32::EPSILON {
            (self.width - x) / dx
        } else if dx < -f32::EPSILON {
            -x / dx
        } else {
            f32::INFINITY
        };
        let ty = if dy > f32::EPSILON {
            (self.height - y) / dy
        } else if dy < -f32::EPSILON {
            -y / dy
        } else {
            f32::INFINITY
        };
        let mut t = tx.min(ty);

        if let Some((cx, cy, r)) = self.obstacle {
            // |p + t·d - c|² = r², nearest positive root
            let (ox, oy) = (cx - x, cy - y);
            let b = ox * dx + oy * dy;
            let disc = b * b - (ox * ox + oy * oy - r * r);
            if disc >= 0.0 {
                let hit = b - disc.sqrt();
                if hit > 0.0 {
                    t = t.min(hit);
                }
            }
        }

        t
    }
}

/// Lidar simulator
pub struct LidarSimulator {
    room: Room,
    sensor: (f32, f32),
    config: SimulationConfig,
    noise: NoiseGenerator,
}

impl LidarSimulator {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            room: Room::from_config(config),
            sensor: (config.sensor_x, config.sensor_y),
            config: config.clone(),
            noise: NoiseGenerator::new(config.random_seed),
        }
    }

    /// Generate one revolution with the sensor heading at `yaw` radians
    pub fn generate_scan(&mut self, options: &LidarOptions, yaw: f32) -> Scan {
        let mut count = options.samples_per_revolution().max(1);
        if !options.fixed_resolution {
            // Free-running motors jitter the sample count a little per revolution
            let jitter = self.noise.uniform_range(-0.01, 0.01) * count as f32;
            count = (count as f32 + jitter).round().max(1.0) as usize;
        }

        let min_angle = options.min_angle.to_radians();
        let max_angle = options.max_angle.to_radians();
        let ignored: Vec<(f32, f32)> = options
            .ignore_ranges()
            .unwrap_or_default()
            .into_iter()
            .map(|(a, b)| (a.to_radians(), b.to_radians()))
            .collect();
        let max_intensity = if options.intensity_bits >= 16 {
            u16::MAX
        } else {
            (1u16 << options.intensity_bits.max(1)) - 1
        };

        let noise_cfg = self.config.noise.clone();
        let step = TAU / count as f32;
        let mut scan = Scan::with_capacity(count);
        scan.scan_time_s = 1.0 / options.scan_frequency;

        for i in 0..count {
            let beam = -PI + i as f32 * step;
            let reported = report_angle(
                beam + self.noise.gaussian(noise_cfg.angle_stddev),
                options,
            );

            if reported < min_angle - ANGLE_TOLERANCE
                || reported > max_angle + ANGLE_TOLERANCE
            {
                continue;
            }
            if ignored.iter().any(|&(a, b)| reported >= a && reported <= b) {
                scan.push(Sample::invalid(reported));
                continue;
            }
            if self.noise.chance(noise_cfg.miss_rate) {
                scan.push(Sample::invalid(reported));
                continue;
            }

            let mut range = self.room.ray_cast(self.sensor.0, self.sensor.1, yaw + beam)
                + self.noise.gaussian(noise_cfg.range_stddev);

            if !options.sun_noise_filter && self.noise.chance(noise_cfg.sun_spike_rate) {
                let upper = 0.5_f32.max(options.min_range + 0.01);
                range = self.noise.uniform_range(options.min_range, upper);
            } else if !options.glass_noise_filter
                && self.noise.chance(noise_cfg.glass_ghost_rate)
            {
                range *= self.noise.uniform_range(1.2, 2.0);
            }

            if !range.is_finite() || range < options.min_range || range > options.max_range {
                scan.push(Sample::invalid(reported));
                continue;
            }

            let sample = if options.intensity {
                let falloff = (1.0 - range / options.max_range).clamp(0.0, 1.0);
                let value = (max_intensity as f32 * falloff).round().max(1.0) as u16;
                Sample::with_intensity(reported, range, value)
            } else {
                Sample::new(reported, range)
            };
            scan.push(sample);
        }

        scan
    }
}

/// Map a beam angle into the device's reporting frame, wrapped to [-π, π)
fn report_angle(beam: f32, options: &LidarOptions) -> f32 {
    let mut angle = beam;
    if options.inverted {
        angle = -angle;
    }
    if options.reversion {
        angle += PI;
    }
    (angle + PI).rem_euclid(TAU) - PI
}
