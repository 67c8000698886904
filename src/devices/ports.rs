//! Serial port discovery and selection
//!
//! The choice between several candidate ports is delegated to an injected
//! [`PortSelector`] so the acquisition path never touches console I/O.

use crate::error::{Error, Result};

/// A serial port that may have a rangefinder attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCandidate {
    /// Device path, e.g. `/dev/ttyUSB0`
    pub path: String,
    /// Adapter description (USB product string when known)
    pub description: String,
}

impl PortCandidate {
    pub fn new(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
        }
    }
}

/// Picks one port out of several candidates
pub trait PortSelector {
    /// Return the chosen port path, or `None` to give up
    fn select(&mut self, candidates: &[PortCandidate]) -> Option<String>;
}

impl<F> PortSelector for F
where
    F: FnMut(&[PortCandidate]) -> Option<String>,
{
    fn select(&mut self, candidates: &[PortCandidate]) -> Option<String> {
        self(candidates)
    }
}

/// Always takes the first candidate
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPortSelector;

impl PortSelector for FirstPortSelector {
    fn select(&mut self, candidates: &[PortCandidate]) -> Option<String> {
        candidates.first().map(|c| c.path.clone())
    }
}

/// Takes the candidate at a fixed index (as listed by [`discover_ports`])
#[derive(Debug, Clone, Copy)]
pub struct IndexPortSelector(pub usize);

impl PortSelector for IndexPortSelector {
    fn select(&mut self, candidates: &[PortCandidate]) -> Option<String> {
        candidates.get(self.0).map(|c| c.path.clone())
    }
}

/// Enumerate serial ports on this host
pub fn discover_ports() -> Result<Vec<PortCandidate>> {
    let mut ports: Vec<PortCandidate> = serialport::available_ports()?
        .into_iter()
        .map(|info| {
            let description = match info.port_type {
                serialport::SerialPortType::UsbPort(usb) => usb
                    .product
                    .unwrap_or_else(|| format!("USB {:04x}:{:04x}", usb.vid, usb.pid)),
                other => format!("{:?}", other),
            };
            PortCandidate::new(info.port_name, description)
        })
        .collect();
    ports.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(ports)
}

/// Choose a port: a lone candidate is taken as-is, otherwise the selector decides
pub fn resolve_port<S: PortSelector + ?Sized>(
    candidates: &[PortCandidate],
    selector: &mut S,
) -> Result<String> {
    if let [only] = candidates {
        log::info!("Auto-selected lidar port: {} ({})", only.path, only.description);
        return Ok(only.path.clone());
    }

    for (i, c) in candidates.iter().enumerate() {
        log::info!("[{}] {} {}", i, c.path, c.description);
    }

    match selector.select(candidates) {
        Some(path) if !path.is_empty() => {
            log::info!("Selected lidar port: {}", path);
            Ok(path)
        }
        _ if candidates.is_empty() => Err(Error::Configuration(
            "no lidar port detected and none selected".to_string(),
        )),
        _ => Err(Error::Configuration(format!(
            "no port selected among {} candidates",
            candidates.len()
        ))),
    }
}
