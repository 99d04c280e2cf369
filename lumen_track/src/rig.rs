//! The vision rig: a background thread that owns the frame source and
//! streams smoothed cursor samples back over a channel.
//!
//! Acquisition can fail (no device, access denied); the rig parks in that
//! state and only re-attempts when the user asks for a rescan.  Shutting
//! the rig down stops the loop and releases the capture stream
//! unconditionally.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::camera::{CameraError, CameraStatus};
use crate::frame::FrameSource;
use crate::tracker::LightTracker;

// ════════════════════════════════════════════════════════════════════════════
// Commands and events
// ════════════════════════════════════════════════════════════════════════════

pub enum RigCommand {
    /// Re-attempt acquisition from `NotFound`/`Error`.  User-initiated
    /// only; ignored while a source is live.
    Rescan,
    /// Terminate the thread, releasing the source.
    Quit,
}

#[derive(Clone, Debug)]
pub enum VisionEvent {
    /// Lifecycle transition, for the status panel.
    Status(CameraStatus),
    /// One smoothed cursor position in screen coordinates.
    Sample { x: f32, y: f32 },
}

/// Produces a frame source, possibly failing with the reason the status
/// panel should show.  Called once at startup and once per rescan.
pub type SourceOpener = Box<dyn FnMut() -> Result<Box<dyn FrameSource>, CameraError> + Send>;

// ════════════════════════════════════════════════════════════════════════════
// VisionRig — handle to the sampling thread
// ════════════════════════════════════════════════════════════════════════════

pub struct VisionRig {
    cmd_tx:   Sender<RigCommand>,
    event_rx: Receiver<VisionEvent>,
}

impl VisionRig {
    /// Spawn the sampling thread.  `screen_w`/`screen_h` define the space
    /// samples are mapped into.
    pub fn spawn(opener: SourceOpener, screen_w: f32, screen_h: f32) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RigCommand>();
        let (event_tx, event_rx) = mpsc::channel::<VisionEvent>();

        thread::spawn(move || rig_thread(opener, screen_w, screen_h, cmd_rx, event_tx));

        VisionRig { cmd_tx, event_rx }
    }

    pub fn rescan(&self) {
        let _ = self.cmd_tx.send(RigCommand::Rescan);
    }

    pub fn quit(&self) {
        let _ = self.cmd_tx.send(RigCommand::Quit);
    }

    /// Drain pending events (non-blocking).
    pub fn drain_events(&self) -> Vec<VisionEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.event_rx.try_recv() {
            out.push(ev);
        }
        out
    }
}

impl Drop for VisionRig {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RigCommand::Quit);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// rig_thread — the sampling loop
// ════════════════════════════════════════════════════════════════════════════

fn rig_thread(
    mut opener: SourceOpener,
    screen_w: f32,
    screen_h: f32,
    cmd_rx: Receiver<RigCommand>,
    event_tx: Sender<VisionEvent>,
) {
    let mut tracker = LightTracker::new(screen_w, screen_h);
    let _ = event_tx.send(VisionEvent::Status(CameraStatus::Idle));
    let mut source = acquire(&mut opener, &event_tx);
    let mut frame_skip = 0u64;

    loop {
        // ── drain commands ────────────────────────────────────────────────
        loop {
            match cmd_rx.try_recv() {
                Ok(RigCommand::Rescan) => {
                    if source.is_none() {
                        let _ = event_tx.send(VisionEvent::Status(CameraStatus::Idle));
                        source = acquire(&mut opener, &event_tx);
                    }
                }
                Ok(RigCommand::Quit) => return,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        let Some(src) = source.as_mut() else {
            // Parked until a rescan arrives
            thread::sleep(Duration::from_millis(50));
            continue;
        };

        match src.next_frame() {
            Ok(frame) => {
                // Analyze every 2nd frame only
                frame_skip += 1;
                if frame_skip % 2 != 0 {
                    continue;
                }
                if let Some((x, y)) = tracker.track(&frame) {
                    if event_tx.send(VisionEvent::Sample { x, y }).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                log::warn!("[vision] stream lost: {}", e);
                let _ = event_tx.send(VisionEvent::Status(e.status()));
                source = None;
            }
        }
    }
}

fn acquire(
    opener: &mut SourceOpener,
    event_tx: &Sender<VisionEvent>,
) -> Option<Box<dyn FrameSource>> {
    match opener() {
        Ok(src) => {
            log::info!("[vision] source acquired");
            let _ = event_tx.send(VisionEvent::Status(CameraStatus::Active));
            Some(src)
        }
        Err(e) => {
            log::warn!("[vision] acquisition failed: {}", e);
            let _ = event_tx.send(VisionEvent::Status(e.status()));
            None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
