//! Acquisition loop: pulls scans, renders them, and owns the run/stop state machine
//!
//! ## Iteration order
//!
//! Every pass through [`AcquisitionLoop::run`] does, in order:
//!
//! 1. check the shared `running` flag (process interrupt)
//! 2. fetch one scan (blocking, bounded by the device timeout)
//! 3. project, composite, present
//! 4. poll the render sink for input (bounded wait)
//!
//! A failed fetch skips 3-4 and goes straight to the next pass; the loop
//! itself is the retry. At most one fetch is ever outstanding.
//!
//! ## Shutdown
//!
//! [`AcquisitionLoop::shutdown`] stops and disconnects the device and
//! disposes the sink. Failures there are logged and swallowed so the rest of
//! teardown still runs. It is idempotent and also runs from `Drop`.

use crate::core::sink::{KeyCode, RenderSink};
use crate::core::source::ScanSource;
use crate::core::types::RunState;
use crate::devices::options::LidarOptions;
use crate::error::{Error, Result};
use crate::render::compositor::{FrameCompositor, FrameStyle};
use crate::render::projection::{PixelCoord, ProjectionConfig, RasterSize, project_into};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Loop timing and stop conditions
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSettings {
    /// Bounded wait for input after each frame
    pub poll_timeout: Duration,
    /// Key that ends the session
    pub cancel_key: KeyCode,
    /// Pause after a failed fetch
    pub failure_backoff: Duration,
    /// Stop with [`Error::DeviceLost`] after this many failures in a row
    pub max_consecutive_failures: Option<u32>,
    /// Period of the statistics log line
    pub stats_interval: Option<Duration>,
    /// Stop cleanly after this many rendered frames
    pub max_frames: Option<u64>,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(10),
            cancel_key: KeyCode::ESCAPE,
            failure_backoff: Duration::from_millis(50),
            max_consecutive_failures: None,
            stats_interval: Some(Duration::from_secs(10)),
            max_frames: None,
        }
    }
}

/// How scans are turned into frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub projection: ProjectionConfig,
    pub size: RasterSize,
    pub style: FrameStyle,
}

impl RenderSettings {
    /// Square `side`-pixel canvas at 50 px/m with the sensor in the middle
    pub fn centered(side: u32) -> Self {
        Self {
            projection: ProjectionConfig::centered(side),
            size: RasterSize::square(side),
            style: FrameStyle::default(),
        }
    }
}

/// Why the loop left the Scanning state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Cancel key reported by the render sink
    CancelKey,
    /// Process interrupt cleared the `running` flag
    Interrupted,
    /// Configured frame budget reached
    FrameLimit,
    /// Consecutive-failure threshold exceeded
    DeviceLost,
    /// Render sink failed
    DisplayFailed,
}

/// Counters for one session
#[derive(Debug, Clone)]
pub struct LoopStats {
    /// Fetch attempts
    pub iterations: u64,
    /// Frames presented
    pub frames: u64,
    /// Fetches that returned an error
    pub failed_fetches: u64,
    /// Current failure streak, reset by a good scan
    pub consecutive_failures: u32,
    /// Pixels marked across all frames
    pub points_drawn: u64,
    /// Session start, for fps
    pub started: Instant,
}

impl LoopStats {
    fn new() -> Self {
        Self {
            iterations: 0,
            frames: 0,
            failed_fetches: 0,
            consecutive_failures: 0,
            points_drawn: 0,
            started: Instant::now(),
        }
    }

    /// Average presented frames per second since start
    pub fn fps(&self) -> f64 {
        let secs = self.started.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Orchestrates source → projection → compositor → sink
pub struct AcquisitionLoop<S: ScanSource, R: RenderSink> {
    source: S,
    sink: R,
    options: LidarOptions,
    projection: ProjectionConfig,
    compositor: FrameCompositor,
    settings: LoopSettings,
    running: Arc<AtomicBool>,
    state: RunState,
    stop_reason: Option<StopReason>,
    stats: LoopStats,
    points: Vec<PixelCoord>,
}

impl<S: ScanSource, R: RenderSink> AcquisitionLoop<S, R> {
    /// Build an idle loop; nothing touches the device until [`start`](Self::start)
    pub fn new(
        source: S,
        sink: R,
        options: LidarOptions,
        render: RenderSettings,
        settings: LoopSettings,
        running: Arc<AtomicBool>,
    ) -> Self {
        let compositor = FrameCompositor::new(
            render.size,
            render.style,
            render.projection.origin_pixel(),
        );
        Self {
            source,
            sink,
            options,
            projection: render.projection,
            compositor,
            settings,
            running,
            state: RunState::Idle,
            stop_reason: None,
            stats: LoopStats::new(),
            points: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!("Run state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Apply options and start the device (Idle → Scanning)
    ///
    /// Any failure leaves the loop Idle and is reported as
    /// [`Error::Configuration`]; no scan is fetched.
    pub fn start(&mut self) -> Result<()> {
        if self.state != RunState::Idle {
            return Err(Error::Configuration(format!(
                "cannot start from {:?}",
                self.state
            )));
        }

        self.source
            .configure(&self.options)
            .map_err(|e| Self::as_configuration("configure", e))?;

        match self.source.pitch_angle() {
            Some(pitch) => info!("Pitch angle: {:.2}°", pitch),
            None => debug!("Device does not report a pitch angle"),
        }

        self.source
            .start()
            .map_err(|e| Self::as_configuration("start", e))?;

        info!(
            "{} scanning at {:.1} Hz",
            self.source.name(),
            self.options.scan_frequency
        );
        self.stats = LoopStats::new();
        self.transition(RunState::Scanning);
        Ok(())
    }

    fn as_configuration(step: &str, e: Error) -> Error {
        match e {
            Error::Configuration(msg) => Error::Configuration(format!("{}: {}", step, msg)),
            other => Error::Configuration(format!("{}: {}", step, other)),
        }
    }

    /// Drive Scanning until a stop condition, then tear down
    ///
    /// Returns the session statistics on a clean stop (cancel key,
    /// interrupt, frame limit). Sustained device loss and display failures
    /// return an error, after teardown has run.
    pub fn run(&mut self) -> Result<LoopStats> {
        match self.state {
            RunState::Scanning => {}
            RunState::Stopped => return Ok(self.stats.clone()),
            other => {
                return Err(Error::Configuration(format!(
                    "run() requires a started device, state is {:?}",
                    other
                )));
            }
        }

        let mut last_report = Instant::now();
        let outcome = loop {
            match self.step() {
                Ok(Some(reason)) => break Ok(reason),
                Ok(None) => {}
                Err(e) => break Err(e),
            }

            if let Some(interval) = self.settings.stats_interval
                && last_report.elapsed() >= interval
            {
                self.log_statistics();
                last_report = Instant::now();
            }
        };

        if self.state == RunState::Scanning {
            self.transition(RunState::Stopping);
        }
        self.shutdown();

        match outcome {
            Ok(reason) => {
                info!("Acquisition stopped: {:?}", reason);
                Ok(self.stats.clone())
            }
            Err(e) => {
                error!("Acquisition aborted: {}", e);
                Err(e)
            }
        }
    }

    /// One iteration; `Some(reason)` once the loop has left Scanning
    ///
    /// Does not tear down; [`run`](Self::run) or [`shutdown`](Self::shutdown)
    /// does that.
    pub fn step(&mut self) -> Result<Option<StopReason>> {
        if !self.running.load(Ordering::Relaxed) {
            return Ok(Some(self.request_stop(StopReason::Interrupted)));
        }

        self.stats.iterations += 1;
        let scan = match self.source.fetch_scan() {
            Ok(scan) => {
                self.stats.consecutive_failures = 0;
                scan
            }
            Err(e) => return self.on_fetch_failure(e),
        };

        project_into(
            &scan,
            &self.projection,
            self.compositor.size(),
            &mut self.points,
        );
        drop(scan);

        let frame = self.compositor.compose(&self.points);
        if let Err(e) = self.sink.present(frame) {
            self.request_stop(StopReason::DisplayFailed);
            return Err(e);
        }
        self.stats.frames += 1;
        self.stats.points_drawn += self.points.len() as u64;

        if let Some(key) = self.sink.poll_event(self.settings.poll_timeout) {
            if key == self.settings.cancel_key {
                info!("Cancel key pressed");
                return Ok(Some(self.request_stop(StopReason::CancelKey)));
            }
            debug!("Ignoring key {:?}", key);
        }

        if let Some(limit) = self.settings.max_frames
            && self.stats.frames >= limit
        {
            return Ok(Some(self.request_stop(StopReason::FrameLimit)));
        }

        Ok(None)
    }

    fn on_fetch_failure(&mut self, e: Error) -> Result<Option<StopReason>> {
        self.stats.failed_fetches += 1;
        self.stats.consecutive_failures += 1;
        warn!(
            "Failed to get lidar data: {} ({} in a row)",
            e, self.stats.consecutive_failures
        );

        if let Some(limit) = self.settings.max_consecutive_failures
            && self.stats.consecutive_failures >= limit
        {
            self.request_stop(StopReason::DeviceLost);
            return Err(Error::DeviceLost {
                consecutive: self.stats.consecutive_failures,
            });
        }

        if !self.settings.failure_backoff.is_zero() {
            std::thread::sleep(self.settings.failure_backoff);
        }
        Ok(None)
    }

    fn request_stop(&mut self, reason: StopReason) -> StopReason {
        if self.state == RunState::Scanning {
            self.stop_reason = Some(reason);
            self.transition(RunState::Stopping);
        }
        reason
    }

    /// Release device and display (→ Stopped); safe to call any number of times
    pub fn shutdown(&mut self) {
        match self.state {
            RunState::Stopped => return,
            RunState::Idle | RunState::Scanning => self.transition(RunState::Stopping),
            RunState::Stopping => {}
        }

        info!("Turning off lidar...");
        if let Err(e) = self.source.stop() {
            warn!("{}", Error::Teardown(format!("device stop: {}", e)));
        }
        if let Err(e) = self.source.disconnect() {
            warn!("{}", Error::Teardown(format!("device disconnect: {}", e)));
        }
        self.sink.dispose();

        self.transition(RunState::Stopped);
        self.log_statistics();
        info!("Lidar disconnected");
    }

    fn log_statistics(&self) {
        info!(
            "Frames: {} ({:.1} fps), failed fetches: {}, points drawn: {}",
            self.stats.frames,
            self.stats.fps(),
            self.stats.failed_fetches,
            self.stats.points_drawn
        );
    }
}

impl<S: ScanSource, R: RenderSink> Drop for AcquisitionLoop<S, R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
