//! Camera lifecycle states, the error taxonomy, and the real capture
//! backend (feature = "camera").

#[cfg(feature = "camera")]
use crate::frame::{Frame, FrameSource, FRAME_H, FRAME_W};

// ════════════════════════════════════════════════════════════════════════════
// CameraStatus
// ════════════════════════════════════════════════════════════════════════════

/// Lifecycle of the capture device as shown to the user.
///
/// `Idle → Active`, or `Idle → NotFound` (no video input enumerated), or
/// `Idle → Error` (access denied / unsupported).  A rescan re-enters
/// `Idle`; there is no automatic retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraStatus {
    Idle,
    Active,
    NotFound,
    Error,
}

impl CameraStatus {
    /// Status-line text for the vision panel.  "Not found" and "denied"
    /// deliberately read differently.
    pub fn status_text(&self) -> &'static str {
        match self {
            CameraStatus::Active   => "LUMINANCE_TRACKING: OK",
            CameraStatus::Error    => "ERROR: ACCESS_DENIED",
            CameraStatus::NotFound => "ERROR: DEVICE_NOT_FOUND",
            CameraStatus::Idle     => "SYSTEM: INITIALIZING...",
        }
    }

    pub fn recoverable(&self) -> bool {
        matches!(self, CameraStatus::NotFound | CameraStatus::Error)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CameraError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("no video input device found")]
    NotFound,
    #[error("camera access denied")]
    AccessDenied,
    #[error("camera unsupported: {0}")]
    Unsupported(String),
    #[error("camera stream failed: {0}")]
    Stream(String),
}

impl CameraError {
    /// The lifecycle state a failed acquisition lands in.
    pub fn status(&self) -> CameraStatus {
        match self {
            CameraError::NotFound => CameraStatus::NotFound,
            _ => CameraStatus::Error,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CameraSource — real webcam via nokhwa (feature = "camera")
// ════════════════════════════════════════════════════════════════════════════

/// Capture source backed by the first enumerated webcam, requested at the
/// 320×240 working resolution and scaled down by nearest sampling when the
/// device insists on something larger.
#[cfg(feature = "camera")]
pub struct CameraSource {
    camera: nokhwa::Camera,
}

#[cfg(feature = "camera")]
impl CameraSource {
    pub fn open() -> Result<Self, CameraError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{
            ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat,
            RequestedFormatType, Resolution,
        };

        let devices = nokhwa::query(ApiBackend::Auto).map_err(classify)?;
        if devices.is_empty() {
            return Err(CameraError::NotFound);
        }

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(FRAME_W as u32, FRAME_H as u32),
                FrameFormat::MJPEG,
                30,
            ),
        ));
        let mut camera =
            nokhwa::Camera::new(CameraIndex::Index(0), requested).map_err(classify)?;
        camera.open_stream().map_err(classify)?;
        Ok(CameraSource { camera })
    }
}

#[cfg(feature = "camera")]
impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Frame, CameraError> {
        use nokhwa::pixel_format::RgbFormat;

        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::Stream(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Stream(e.to_string()))?;

        let (src_w, src_h) = (image.width() as usize, image.height() as usize);
        let raw = image.as_raw();

        let mut frame = Frame::black();
        for y in 0..FRAME_H {
            let sy = y * src_h / FRAME_H;
            for x in 0..FRAME_W {
                let sx = x * src_w / FRAME_W;
                let o = (sy * src_w + sx) * 3;
                frame.set_px(x, y, raw[o], raw[o + 1], raw[o + 2]);
            }
        }
        Ok(frame)
    }
}

#[cfg(feature = "camera")]
impl Drop for CameraSource {
    fn drop(&mut self) {
        // Track stop — the stream is released with the source, always.
        let _ = self.camera.stop_stream();
    }
}

/// Sort a backend error into the user-facing taxonomy the same way the
/// status panel phrases it.
#[cfg(feature = "camera")]
fn classify(e: nokhwa::NokhwaError) -> CameraError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("denied") || lower.contains("permission") {
        CameraError::AccessDenied
    } else if lower.contains("not found") || lower.contains("no device") {
        CameraError::NotFound
    } else {
        CameraError::Unsupported(msg)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_texts_distinguish_failures() {
        assert_ne!(
            CameraStatus::NotFound.status_text(),
            CameraStatus::Error.status_text()
        );
        assert!(CameraStatus::NotFound.status_text().contains("NOT_FOUND"));
        assert!(CameraStatus::Error.status_text().contains("DENIED"));
    }

    #[test]
    fn only_failures_are_recoverable() {
        assert!(CameraStatus::NotFound.recoverable());
        assert!(CameraStatus::Error.recoverable());
        assert!(!CameraStatus::Idle.recoverable());
        assert!(!CameraStatus::Active.recoverable());
    }

    #[test]
    fn error_maps_to_status() {
        assert_eq!(CameraError::NotFound.status(), CameraStatus::NotFound);
        assert_eq!(CameraError::AccessDenied.status(), CameraStatus::Error);
        assert_eq!(
            CameraError::Unsupported("no api".into()).status(),
            CameraStatus::Error
        );
    }
}
