//! Test doubles for acquisition loop scenarios.
//!
//! Counters live behind `Arc` so they stay readable after the loop (and its
//! owned source and sink) has been dropped.

#![allow(dead_code)]

use drishti_view::core::sink::{KeyCode, RenderSink};
use drishti_view::core::source::ScanSource;
use drishti_view::core::types::{Sample, Scan};
use drishti_view::devices::options::LidarOptions;
use drishti_view::error::{Error, Result};
use drishti_view::render::frame::RasterFrame;
use drishti_view::{AcquisitionLoop, LoopSettings, RenderSettings};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

/// Lifecycle call counts for a [`ScriptedSource`]
#[derive(Debug, Default)]
pub struct SourceCalls {
    pub configure: AtomicU32,
    pub start: AtomicU32,
    pub fetch: AtomicU32,
    pub stop: AtomicU32,
    pub disconnect: AtomicU32,
}

/// Plays back a fixed sequence of fetch results
///
/// Once the script is exhausted every fetch returns a ring of points at
/// 2 m radius.
pub struct ScriptedSource {
    script: VecDeque<Result<Scan>>,
    fail_start: bool,
    fail_teardown: bool,
    pub calls: Arc<SourceCalls>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Scan>>) -> Self {
        Self {
            script: script.into(),
            fail_start: false,
            fail_teardown: false,
            calls: Arc::new(SourceCalls::default()),
        }
    }

    /// Source whose `start` is rejected by the device
    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::new(Vec::new())
        }
    }

    /// Source whose `stop` and `disconnect` both report errors
    pub fn failing_teardown() -> Self {
        Self {
            fail_teardown: true,
            ..Self::new(Vec::new())
        }
    }

    /// Source that never delivers a scan
    pub fn always_failing(n: usize) -> Self {
        Self::new((0..n).map(|_| Err(Error::Timeout)).collect())
    }
}

impl ScanSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn configure(&mut self, options: &LidarOptions) -> Result<()> {
        self.calls.configure.fetch_add(1, Ordering::SeqCst);
        options.validate()
    }

    fn start(&mut self) -> Result<()> {
        self.calls.start.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(Error::Acquisition("motor did not spin up".to_string()));
        }
        Ok(())
    }

    fn fetch_scan(&mut self) -> Result<Scan> {
        self.calls.fetch.fetch_add(1, Ordering::SeqCst);
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(ring_scan(360, 2.0)))
    }

    fn stop(&mut self) -> Result<()> {
        self.calls.stop.fetch_add(1, Ordering::SeqCst);
        if self.fail_teardown {
            return Err(Error::Acquisition("motor stop not acknowledged".to_string()));
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.calls.disconnect.fetch_add(1, Ordering::SeqCst);
        if self.fail_teardown {
            return Err(Error::Other("port already closed".to_string()));
        }
        Ok(())
    }

    fn pitch_angle(&mut self) -> Option<f32> {
        Some(0.5)
    }
}

/// Call counts for a [`RecordingSink`]
#[derive(Debug, Default)]
pub struct SinkCalls {
    pub present: AtomicU32,
    pub poll: AtomicU32,
    pub dispose: AtomicU32,
}

/// Keeps the last presented frame and replays scripted key presses
pub struct RecordingSink {
    /// Key reported on the Nth poll (1-based)
    keys: HashMap<u32, KeyCode>,
    fail_present: bool,
    pub last_frame: Option<RasterFrame>,
    pub calls: Arc<SinkCalls>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            fail_present: false,
            last_frame: None,
            calls: Arc::new(SinkCalls::default()),
        }
    }

    /// Report `key` on poll number `poll` (1-based)
    pub fn with_key(mut self, poll: u32, key: KeyCode) -> Self {
        self.keys.insert(poll, key);
        self
    }

    /// Sink whose surface is gone
    pub fn broken() -> Self {
        Self {
            fail_present: true,
            ..Self::new()
        }
    }
}

impl RenderSink for RecordingSink {
    fn present(&mut self, frame: &RasterFrame) -> Result<()> {
        if self.fail_present {
            return Err(Error::Display("window closed".to_string()));
        }
        self.calls.present.fetch_add(1, Ordering::SeqCst);
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn poll_event(&mut self, _timeout: Duration) -> Option<KeyCode> {
        let n = self.calls.poll.fetch_add(1, Ordering::SeqCst) + 1;
        self.keys.get(&n).copied()
    }

    fn dispose(&mut self) {
        self.calls.dispose.fetch_add(1, Ordering::SeqCst);
    }
}

/// Full circle of `n` samples at a constant range
pub fn ring_scan(n: usize, range: f32) -> Scan {
    let step = std::f32::consts::TAU / n as f32;
    Scan::from_samples(
        (0..n)
            .map(|i| Sample::new(-std::f32::consts::PI + i as f32 * step, range))
            .collect(),
    )
}

/// Loop settings with no sleeps and no periodic logging
pub fn fast_settings() -> LoopSettings {
    LoopSettings {
        poll_timeout: Duration::ZERO,
        failure_backoff: Duration::ZERO,
        stats_interval: None,
        ..LoopSettings::default()
    }
}

/// Route loop logging to the test harness output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 800x800 loop at 50 px/m over the given source and sink
pub fn build_loop<S: ScanSource, R: RenderSink>(
    source: S,
    sink: R,
    settings: LoopSettings,
    running: Arc<AtomicBool>,
) -> AcquisitionLoop<S, R> {
    init_logging();
    AcquisitionLoop::new(
        source,
        sink,
        LidarOptions::tmini_defaults(),
        RenderSettings::centered(800),
        settings,
        running,
    )
}

pub fn running_flag() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(true))
}
