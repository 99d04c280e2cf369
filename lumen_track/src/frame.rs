//! The fixed-resolution working frame and the capture abstraction.
//!
//! Everything downstream of capture sees the same thing: a 320×240 RGBA
//! buffer.  Where the frame came from — a real webcam or the simulated
//! light source — is behind [`FrameSource`], so the tracking pipeline runs
//! identically in both modes.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crate::camera::CameraError;

/// Working resolution for all brightness analysis.
pub const FRAME_W: usize = 320;
pub const FRAME_H: usize = 240;

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// One captured RGBA frame at the working resolution.
#[derive(Clone)]
pub struct Frame {
    pub data: Vec<u8>,
}

impl Frame {
    pub fn black() -> Self {
        Frame { data: vec![0; FRAME_W * FRAME_H * 4] }
    }

    pub fn set_px(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        if x < FRAME_W && y < FRAME_H {
            let o = (y * FRAME_W + x) * 4;
            self.data[o] = r;
            self.data[o + 1] = g;
            self.data[o + 2] = b;
            self.data[o + 3] = 0xFF;
        }
    }

    /// Channel sum of the pixel at a linear pixel index.
    pub fn channel_sum(&self, px: usize) -> u32 {
        let o = px * 4;
        self.data[o] as u32 + self.data[o + 1] as u32 + self.data[o + 2] as u32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver frames.  `next_frame` blocks until one is
/// available; an error ends the stream and drops the rig back into a
/// failure state until a rescan.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Frame, CameraError>;
}

// ════════════════════════════════════════════════════════════════════════════
// GlowSource — simulated light (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Simulated capture: a bright blob painted onto a dark frame at whatever
/// normalized position last arrived on the channel.  The window loop feeds
/// the real pointer position here, so the full tracking pipeline — sparse
/// scan, threshold, mirroring, smoothing, dwell — still runs in simulation
/// mode.
pub struct GlowSource {
    rx:  Receiver<(f32, f32)>,
    pos: (f32, f32),
}

/// Blob half-extent in pixels.  Wide enough that the sparse scan (every
/// 20th pixel) cannot step over it.
const GLOW_HALF_W: i32 = 12;
const GLOW_HALF_H: i32 = 2;

impl GlowSource {
    /// `rx` carries normalized `[0,1]²` light positions; starts centered.
    pub fn new(rx: Receiver<(f32, f32)>) -> Self {
        GlowSource { rx, pos: (0.5, 0.5) }
    }
}

impl FrameSource for GlowSource {
    fn next_frame(&mut self) -> Result<Frame, CameraError> {
        loop {
            match self.rx.try_recv() {
                Ok(pos) => self.pos = pos,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(CameraError::Stream("light feed disconnected".into()))
                }
            }
        }

        // Pre-mirrored so the tracker's webcam flip cancels out.
        let nx = (1.0 - self.pos.0).clamp(0.0, 1.0);
        let ny = self.pos.1.clamp(0.0, 1.0);
        let cx = (nx * (FRAME_W - 1) as f32) as i32;
        let cy = (ny * (FRAME_H - 1) as f32) as i32;

        let mut frame = Frame::black();
        for dy in -GLOW_HALF_H..=GLOW_HALF_H {
            for dx in -GLOW_HALF_W..=GLOW_HALF_W {
                let (x, y) = (cx + dx, cy + dy);
                if x >= 0 && y >= 0 {
                    frame.set_px(x as usize, y as usize, 0xFF, 0xFF, 0xFF);
                }
            }
        }

        // Pace like a device delivering ~60 fps
        std::thread::sleep(Duration::from_millis(16));
        Ok(frame)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
