//! Rendering pipeline: projection, compositing, and headless sinks

pub mod compositor;
pub mod frame;
pub mod projection;
pub mod sinks;

pub use compositor::{FrameCompositor, FrameStyle};
pub use frame::{Color, RasterFrame};
pub use projection::{PixelCoord, ProjectionConfig, RasterSize, project, project_into};
pub use sinks::{NullSink, SnapshotSink};
