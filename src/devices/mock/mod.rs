//! Simulated rangefinder for hardware-free runs
//!
//! [`SimulatedLidar`] implements [`ScanSource`] on top of a ray-casting room
//! model. It enforces the same lifecycle a real driver does: options must be
//! applied before `start`, scans are only delivered while scanning, and
//! `stop`/`disconnect` are idempotent.
//!
//! With `realtime = true` each fetch blocks until the next revolution is due
//! at the configured scan frequency, which mirrors a serial driver waiting on
//! the wire.

pub mod config;
pub mod lidar_sim;
pub mod noise;

use crate::core::source::ScanSource;
use crate::core::types::Scan;
use crate::devices::options::{DeviceType, LidarOptions};
use crate::error::{Error, Result};
use config::SimulationConfig;
use lidar_sim::LidarSimulator;
use noise::NoiseGenerator;
use std::time::{Duration, Instant};

/// Simulated rangefinder
pub struct SimulatedLidar {
    config: SimulationConfig,
    options: Option<LidarOptions>,
    simulator: LidarSimulator,
    faults: NoiseGenerator,
    connected: bool,
    scanning: bool,
    yaw: f32,
    started_at: Option<Instant>,
    next_due: Option<Instant>,
    revolutions: u64,
    failures: u64,
}

impl SimulatedLidar {
    /// Create a disconnected simulator; `configure` opens it
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let simulator = LidarSimulator::new(&config);
        // Separate stream so fault injection does not perturb measurement noise
        let fault_seed = match config.random_seed {
            0 => 0,
            seed => seed.wrapping_mul(31).wrapping_add(7),
        };
        let faults = NoiseGenerator::new(fault_seed);
        Ok(Self {
            config,
            options: None,
            simulator,
            faults,
            connected: false,
            scanning: false,
            yaw: 0.0,
            started_at: None,
            next_due: None,
            revolutions: 0,
            failures: 0,
        })
    }

    /// Whether the motor is spinning
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Whether the device handle is open
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// (revolutions delivered, fetches failed)
    pub fn stats(&self) -> (u64, u64) {
        (self.revolutions, self.failures)
    }

    fn period(options: &LidarOptions) -> Duration {
        Duration::from_secs_f32(1.0 / options.scan_frequency)
    }

    fn wait_for_revolution(&mut self, period: Duration) {
        let now = Instant::now();
        let due = self.next_due.unwrap_or(now);
        if due > now {
            std::thread::sleep(due - now);
        }
        // Late fetches do not accumulate debt
        self.next_due = Some(due.max(now) + period);
    }
}

impl ScanSource for SimulatedLidar {
    fn name(&self) -> &str {
        "simulated"
    }

    fn configure(&mut self, options: &LidarOptions) -> Result<()> {
        if self.scanning {
            return Err(Error::Configuration(
                "cannot change options while scanning".to_string(),
            ));
        }
        options.validate()?;
        if options.device_type != DeviceType::Serial {
            return Err(Error::Configuration(format!(
                "simulated device only emulates serial links, got {:?}",
                options.device_type
            )));
        }

        log::debug!(
            "Simulated lidar: port={:?} baud={} {} samples/rev at {:.1} Hz",
            options.serial_port,
            options.baud_rate,
            options.samples_per_revolution(),
            options.scan_frequency
        );
        self.options = Some(options.clone());
        self.connected = true;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if self.options.is_none() || !self.connected {
            return Err(Error::Configuration(
                "device must be configured before start".to_string(),
            ));
        }
        if self.scanning {
            return Ok(());
        }

        log::info!("Simulated lidar: motor on");
        self.scanning = true;
        self.started_at = Some(Instant::now());
        self.next_due = None;
        Ok(())
    }

    fn fetch_scan(&mut self) -> Result<Scan> {
        if !self.scanning {
            return Err(Error::NotInitialized);
        }
        let options = self.options.clone().ok_or(Error::NotInitialized)?;
        let period = Self::period(&options);

        if self.config.realtime {
            self.wait_for_revolution(period);
        }
        self.yaw += self.config.spin_rate * period.as_secs_f32();

        if self.faults.chance(self.config.failure_rate) {
            self.failures += 1;
            return Err(if self.failures % 2 == 0 {
                Error::Timeout
            } else {
                Error::Acquisition("corrupted revolution packet".to_string())
            });
        }

        let mut scan = self.simulator.generate_scan(&options, self.yaw);
        scan.timestamp_ms = self
            .started_at
            .map(|t| t.elapsed().as_millis() as u64);
        self.revolutions += 1;
        Ok(scan)
    }

    fn stop(&mut self) -> Result<()> {
        if self.scanning {
            log::info!("Simulated lidar: motor off");
            self.scanning = false;
        }
        Ok(())
    }

    fn pitch_angle(&mut self) -> Option<f32> {
        self.connected.then_some(self.config.pitch_angle)
    }

    fn disconnect(&mut self) -> Result<()> {
        self.stop()?;
        if self.connected {
            log::info!(
                "Simulated lidar: disconnected after {} revolutions ({} failed)",
                self.revolutions,
                self.failures
            );
            self.connected = false;
        }
        Ok(())
    }
}
