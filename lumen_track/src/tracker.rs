//! Brightest-region tracking: frame in, smoothed screen position out.

use crate::frame::{Frame, FRAME_H, FRAME_W};

/// Scan every Nth pixel.  Coarse, but light sources are big and the loop
/// runs every other rendered frame.
pub const SAMPLE_STRIDE: usize = 20;

/// Channel-sum floor; a frame whose brightest sample is at or below this
/// produces no cursor update.
pub const LUMA_THRESHOLD: u32 = 150;

/// Exponential smoothing factor toward the newest target.
pub const SMOOTHING: f32 = 0.25;

// ════════════════════════════════════════════════════════════════════════════
// LightTracker
// ════════════════════════════════════════════════════════════════════════════

/// Turns raw frames into a smoothed cursor position in screen coordinates.
///
/// Webcam frames are mirrored (the user faces the lens), so the winning
/// pixel's x flips before mapping to the screen.
pub struct LightTracker {
    screen_w: f32,
    screen_h: f32,
    smoothed: (f32, f32),
}

impl LightTracker {
    /// Starts centered on the screen, like a freshly shown cursor.
    pub fn new(screen_w: f32, screen_h: f32) -> Self {
        LightTracker {
            screen_w,
            screen_h,
            smoothed: (screen_w / 2.0, screen_h / 2.0),
        }
    }

    /// Analyze one frame.  Returns the updated smoothed position, or
    /// `None` when nothing bright enough was seen (the cursor holds).
    pub fn track(&mut self, frame: &Frame) -> Option<(f32, f32)> {
        let mut best = 0u32;
        let mut bx = 0usize;
        let mut by = 0usize;

        let mut px = 0usize;
        while px < FRAME_W * FRAME_H {
            let sum = frame.channel_sum(px);
            if sum > best {
                best = sum;
                bx = px % FRAME_W;
                by = px / FRAME_W;
            }
            px += SAMPLE_STRIDE;
        }

        if best <= LUMA_THRESHOLD {
            return None;
        }

        let mirrored_x = (FRAME_W - 1 - bx) as f32;
        let target_x = mirrored_x / FRAME_W as f32 * self.screen_w;
        let target_y = by as f32 / FRAME_H as f32 * self.screen_h;

        self.smoothed.0 += (target_x - self.smoothed.0) * SMOOTHING;
        self.smoothed.1 += (target_y - self.smoothed.1) * SMOOTHING;
        Some(self.smoothed)
    }

    pub fn position(&self) -> (f32, f32) {
        self.smoothed
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_bar(cx: usize, cy: usize) -> Frame {
        let mut f = Frame::black();
        for dx in 0..=24 {
            let x = (cx + dx).saturating_sub(12);
            f.set_px(x, cy, 0xFF, 0xFF, 0xFF);
        }
        f
    }

    #[test]
    fn dark_frame_yields_no_update() {
        let mut t = LightTracker::new(1280.0, 800.0);
        let before = t.position();
        assert!(t.track(&Frame::black()).is_none());
        assert_eq!(t.position(), before);
    }

    #[test]
    fn dim_frame_stays_below_threshold() {
        let mut t = LightTracker::new(1280.0, 800.0);
        let mut f = Frame::black();
        // 50+50+50 = 150: at the floor, still rejected
        for x in 0..FRAME_W {
            f.set_px(x, 120, 50, 50, 50);
        }
        assert!(t.track(&f).is_none());
    }

    #[test]
    fn bright_spot_pulls_cursor_mirrored() {
        let mut t = LightTracker::new(1280.0, 800.0);
        // Light on the frame's left edge appears on the screen's right
        let f = frame_with_bar(20, 120);
        let (sx, _) = t.track(&f).unwrap();
        assert!(sx > 640.0, "expected pull right, got {}", sx);
    }

    #[test]
    fn smoothing_converges_geometrically() {
        let mut t = LightTracker::new(1000.0, 1000.0);
        let f = frame_with_bar(60, 60);
        // Bar at frame (60,60) maps mirrored to screen (809.375, 250)
        let target = (809.375f32, 250.0f32);
        // Repeated identical frames close a quarter of the gap each tick
        let mut last_gap = f32::MAX;
        for _ in 0..20 {
            let (sx, sy) = t.track(&f).unwrap();
            let gap = ((sx - target.0).powi(2) + (sy - target.1).powi(2)).sqrt();
            assert!(gap <= last_gap);
            last_gap = gap;
        }
        assert!(last_gap < 40.0, "still {} away after 20 ticks", last_gap);
    }
}
