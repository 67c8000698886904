//! Headless render sinks
//!
//! - [`SnapshotSink`]: writes frames to a PNG file and takes key codes from
//!   stdin, for terminals without a window system.
//! - [`NullSink`]: discards frames, never reports input.

use crate::core::sink::{KeyCode, RenderSink};
use crate::error::{Error, Result};
use crate::render::frame::RasterFrame;
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use image::ImageFormat;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Spawn a detached thread that forwards every stdin byte as a key code
///
/// Newlines are dropped so line-buffered terminals deliver just the key.
/// The thread ends on EOF or once the receiver is gone.
pub fn spawn_stdin_keys() -> Result<Receiver<KeyCode>> {
    let (tx, rx) = bounded::<KeyCode>(64);
    std::thread::Builder::new()
        .name("stdin-keys".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for byte in stdin.lock().bytes() {
                let Ok(byte) = byte else { break };
                if byte == b'\n' || byte == b'\r' {
                    continue;
                }
                if tx.send(KeyCode(byte as u32)).is_err() {
                    break;
                }
            }
            log::debug!("stdin key reader finished");
        })
        .map_err(|e| Error::Other(format!("Failed to spawn stdin key reader: {}", e)))?;
    Ok(rx)
}

/// Writes every Nth frame to a PNG file
pub struct SnapshotSink {
    path: PathBuf,
    every: u32,
    keys: Option<Receiver<KeyCode>>,
    presented: u64,
    written: u64,
    disposed: bool,
}

impl SnapshotSink {
    /// `every = 1` writes each frame; the first frame is always written
    pub fn new(path: impl Into<PathBuf>, every: u32, keys: Option<Receiver<KeyCode>>) -> Self {
        Self {
            path: path.into(),
            every: every.max(1),
            keys,
            presented: 0,
            written: 0,
            disposed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of PNG files written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    fn write_png(&self, frame: &RasterFrame) -> Result<()> {
        // Write-then-rename so viewers never read a half-written file
        let tmp = self.path.with_extension("png.partial");
        frame
            .as_image()
            .save_with_format(&tmp, ImageFormat::Png)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl RenderSink for SnapshotSink {
    fn present(&mut self, frame: &RasterFrame) -> Result<()> {
        if self.disposed {
            return Err(Error::Display("snapshot surface already disposed".to_string()));
        }
        let due = self.presented % self.every as u64 == 0;
        self.presented += 1;
        if due {
            self.write_png(frame).map_err(|e| {
                Error::Display(format!("writing {}: {}", self.path.display(), e))
            })?;
            self.written += 1;
            log::trace!("Snapshot {} -> {}", self.written, self.path.display());
        }
        Ok(())
    }

    fn poll_event(&mut self, timeout: Duration) -> Option<KeyCode> {
        let keys = self.keys.as_ref()?;
        match keys.recv_timeout(timeout) {
            Ok(key) => Some(key),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("Key input closed");
                self.keys = None;
                None
            }
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.keys = None;
        log::info!(
            "Snapshot surface closed: {} frames presented, {} written to {}",
            self.presented,
            self.written,
            self.path.display()
        );
    }
}

/// Discards frames
#[derive(Debug, Default)]
pub struct NullSink {
    presented: u64,
    disposed: bool,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl RenderSink for NullSink {
    fn present(&mut self, _frame: &RasterFrame) -> Result<()> {
        self.presented += 1;
        Ok(())
    }

    fn poll_event(&mut self, _timeout: Duration) -> Option<KeyCode> {
        None
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn frame() -> RasterFrame {
        let mut frame = RasterFrame::new(16, 16, [0, 0, 0]);
        frame.set(3, 4, [255, 255, 0]);
        frame
    }

    #[test]
    fn test_snapshot_written_and_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.png");
        let mut sink = SnapshotSink::new(&path, 1, None);

        sink.present(&frame()).unwrap();
        assert_eq!(sink.written(), 1);

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (16, 16));
        assert_eq!(img.get_pixel(3, 4).0, [255, 255, 0]);
        assert!(!path.with_extension("png.partial").exists());
    }

    #[test]
    fn test_snapshot_every_nth() {
        let dir = TempDir::new().unwrap();
        let mut sink = SnapshotSink::new(dir.path().join("scan.png"), 3, None);
        for _ in 0..7 {
            sink.present(&frame()).unwrap();
        }
        // frames 0, 3, 6
        assert_eq!(sink.written(), 3);
    }

    #[test]
    fn test_poll_event_from_channel() {
        let (tx, rx) = bounded(4);
        let dir = TempDir::new().unwrap();
        let mut sink = SnapshotSink::new(dir.path().join("scan.png"), 1, Some(rx));

        assert_eq!(sink.poll_event(Duration::from_millis(1)), None);
        tx.send(KeyCode::ESCAPE).unwrap();
        assert_eq!(
            sink.poll_event(Duration::from_millis(10)),
            Some(KeyCode::ESCAPE)
        );
        drop(tx);
        assert_eq!(sink.poll_event(Duration::from_millis(1)), None);
    }

    #[test]
    fn test_dispose_twice_and_present_after() {
        let dir = TempDir::new().unwrap();
        let mut sink = SnapshotSink::new(dir.path().join("scan.png"), 1, None);
        sink.dispose();
        sink.dispose();
        assert!(matches!(sink.present(&frame()), Err(Error::Display(_))));
    }

    #[test]
    fn test_unwritable_path_is_display_error() {
        let dir = TempDir::new().unwrap();
        let mut sink = SnapshotSink::new(dir.path().join("missing/dir/scan.png"), 1, None);
        assert!(matches!(sink.present(&frame()), Err(Error::Display(_))));
    }
}
