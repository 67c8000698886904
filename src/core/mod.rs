//! Core abstractions for the acquisition pipeline.
//!
//! - [`source::ScanSource`]: Trait to implement for new rangefinders
//! - [`sink::RenderSink`]: Trait to implement for new display surfaces
//! - [`types`]: Samples, scans, and the run state machine

pub mod sink;
pub mod source;
pub mod types;
