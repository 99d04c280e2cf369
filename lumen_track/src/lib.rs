//! # lumen_track
//!
//! Webcam brightness tracking for a virtual cursor: point a light (or a
//! bright phone screen) at the camera and the brightest region of the
//! frame becomes a pointer.  Holding it still charges a click; a sharp
//! jerk releases a grabbed window.
//!
//! ## Pipeline
//!
//! | Stage | What happens |
//! |---|---|
//! | capture | 320×240 frame from a [`frame::FrameSource`] |
//! | scan | every 20th pixel, brightest by channel sum, floor 150 |
//! | map | mirror x, scale into screen coordinates |
//! | smooth | `pos += (target − pos) · 0.25` |
//! | dwell | displacement < 20 charges; 31 still ticks → click |
//! | breakaway | displacement > 150 while grabbed → release |
//!
//! Analysis runs on every second frame only.  The sampling loop lives in
//! its own thread ([`rig::VisionRig`]) and owns the capture stream for its
//! whole lifetime; smoothed positions and lifecycle transitions come back
//! over a channel.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: a [`frame::GlowSource`] paints a
//!   bright blob wherever the host feeds it, so the full pipeline runs
//!   with no hardware.
//! * `camera` — **Hardware mode**: captures from the first webcam via
//!   `nokhwa`.
//!
//! Acquisition failures are states, not crashes: `NotFound` (nothing
//! enumerated) and `Error` (denied / unsupported) park the rig until a
//! user-initiated rescan.

pub mod camera;
pub mod dwell;
pub mod frame;
pub mod rig;
pub mod tracker;

pub use camera::{CameraError, CameraStatus};
pub use dwell::{DwellGauge, DwellOutcome};
pub use frame::{Frame, FrameSource, GlowSource, FRAME_H, FRAME_W};
pub use rig::{RigCommand, SourceOpener, VisionEvent, VisionRig};
pub use tracker::LightTracker;
