use image::RgbaImage;
use xcap::Monitor;

use deskbot_core::{errors::Error, ports::ScreenCapture, Result};

/// Captures the monitor at the desktop origin, which is the primary display on
/// every platform xcap supports.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrimaryDisplay;

impl PrimaryDisplay {
    fn primary_monitor() -> Result<Monitor> {
        match Monitor::from_point(0, 0) {
            Ok(m) => Ok(m),
            Err(e) => {
                tracing::debug!("no monitor at origin ({e}), falling back to the first one");
                Monitor::all()
                    .map_err(map_xcap_error)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::Capture("no monitors available".to_string()))
            }
        }
    }
}

impl ScreenCapture for PrimaryDisplay {
    fn capture_primary(&self) -> Result<RgbaImage> {
        let monitor = Self::primary_monitor()?;
        monitor.capture_image().map_err(map_xcap_error)
    }
}

fn map_xcap_error(e: impl std::fmt::Display) -> Error {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("permission") || lower.contains("access denied") {
        return Error::Capture(format!(
            "{msg} (grant screen recording permission to this process)"
        ));
    }
    if lower.contains("display") || lower.contains("connection") {
        return Error::Capture(format!("{msg} (is a graphical session running?)"));
    }
    Error::Capture(msg)
}
