//! RenderSink trait definition

use crate::error::Result;
use crate::render::frame::RasterFrame;
use std::time::Duration;

/// Key code reported by a render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    /// Escape key
    pub const ESCAPE: KeyCode = KeyCode(27);
}

impl From<char> for KeyCode {
    fn from(c: char) -> Self {
        KeyCode(c as u32)
    }
}

/// Display abstraction consumed by the acquisition loop
pub trait RenderSink {
    /// Show a composed frame
    fn present(&mut self, frame: &RasterFrame) -> Result<()>;

    /// Wait up to `timeout` for the next user input event
    fn poll_event(&mut self, timeout: Duration) -> Option<KeyCode>;

    /// Release the render surface. Must be safe to call more than once.
    fn dispose(&mut self);
}

impl<R: RenderSink + ?Sized> RenderSink for Box<R> {
    fn present(&mut self, frame: &RasterFrame) -> Result<()> {
        (**self).present(frame)
    }

    fn poll_event(&mut self, timeout: Duration) -> Option<KeyCode> {
        (**self).poll_event(timeout)
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }
}
