//! Scan data and loop state types

/// A single range measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Beam angle in radians (any finite value, not normalized)
    pub angle: f32,
    /// Range in meters; NaN or negative marks an invalid return
    pub range: f32,
    /// Return intensity, when the device reports it
    pub intensity: Option<u16>,
}

impl Sample {
    /// Create a sample without intensity
    pub fn new(angle: f32, range: f32) -> Self {
        Self {
            angle,
            range,
            intensity: None,
        }
    }

    /// Create a sample carrying an intensity value
    pub fn with_intensity(angle: f32, range: f32, intensity: u16) -> Self {
        Self {
            angle,
            range,
            intensity: Some(intensity),
        }
    }

    /// Sentinel for a beam with no usable return
    pub fn invalid(angle: f32) -> Self {
        Self {
            angle,
            range: f32::NAN,
            intensity: None,
        }
    }

    /// True when the range can be projected
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.range.is_finite() && self.range >= 0.0
    }

    /// Convert to Cartesian coordinates (x, y) in meters
    #[inline]
    pub fn to_cartesian(&self) -> (f32, f32) {
        let (sin, cos) = self.angle.sin_cos();
        (self.range * cos, self.range * sin)
    }
}

/// One revolution of samples, in the order the device emitted them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scan {
    /// Measurement samples (not guaranteed sorted by angle)
    pub samples: Vec<Sample>,
    /// Device timestamp in milliseconds (if available)
    pub timestamp_ms: Option<u64>,
    /// Duration of the revolution in seconds
    pub scan_time_s: f32,
}

impl Scan {
    /// Create a new empty scan
    pub fn new() -> Self {
        Self::default()
    }

    /// Create scan with capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Build a scan from samples
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            ..Self::default()
        }
    }

    /// Add a sample to the scan
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Number of samples, valid or not
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if scan is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples with a usable range
    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_valid()).count()
    }
}

/// Acquisition state machine
///
/// ```text
/// Idle ──start ok──▶ Scanning ──cancel/interrupt/fatal──▶ Stopping ──teardown──▶ Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Created, device not started
    #[default]
    Idle,
    /// Device running, scans are being pulled
    Scanning,
    /// Stop requested, teardown pending
    Stopping,
    /// Device and display released (terminal)
    Stopped,
}

impl RunState {
    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Idle, RunState::Scanning)
                | (RunState::Idle, RunState::Stopping)
                | (RunState::Scanning, RunState::Stopping)
                | (RunState::Stopping, RunState::Stopped)
        )
    }

    /// Terminal state check
    pub fn is_terminal(self) -> bool {
        self == RunState::Stopped
    }
}
