//! DrishtiView - real-time viewer for 2D rotating rangefinders
//!
//! Pulls one scan per revolution from a [`ScanSource`], projects it onto a
//! fixed-size raster, composes a frame and hands it to a [`RenderSink`],
//! all from a single [`AcquisitionLoop`] that owns the run/stop state.
//!
//! ```text
//! ScanSource ─▶ AcquisitionLoop ─▶ project_into ─▶ FrameCompositor ─▶ RenderSink
//!                     ▲                                                   │
//!                     └──────────────────── key event ◀───────────────────┘
//! ```

pub mod acquisition;
pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod exit;
pub mod render;

// Re-export commonly used types
pub use acquisition::{AcquisitionLoop, LoopSettings, LoopStats, RenderSettings, StopReason};
pub use config::AppConfig;
pub use core::sink::{KeyCode, RenderSink};
pub use core::source::ScanSource;
pub use core::types::{RunState, Sample, Scan};
pub use devices::options::LidarOptions;
pub use error::{Error, Result};
pub use exit::{EXIT_DEVICE_START_FAILED, EXIT_FAILURE, EXIT_OK, Failure, exit_code};
