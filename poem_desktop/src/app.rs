//! Top-level application state machine.
//!
//! `AppState` owns the node store, the background mode, the virtual
//! cursor, the reveal board, and the pointer arbiter.  Every mutation of
//! shared state — from the window, from the vision rig — lands here, on
//! one writer, one event at a time.

use std::sync::mpsc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lumen_track::{
    CameraStatus, DwellGauge, DwellOutcome, SourceOpener, VisionEvent, VisionRig,
};
use poem_graph::lexicon::{split_words, BOOTSTRAP_TEXT};
use poem_graph::{
    attempt_merge, next_background, spawn_from_word, BackgroundKind, NodeId, NodeStore, Viewport,
    TITLE_BAR_H,
};

use crate::arbiter::PointerArbiter;
use crate::cursor::VirtualCursor;
use crate::reveal::RevealBoard;
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full installation.
pub struct AppConfig {
    pub viewport: Viewport,
    /// Start with the vision driver engaged.
    pub vision: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig { viewport: Viewport::new(1280.0, 800.0), vision: false }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UiEvent — semantic input from the presentation layer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub enum UiEvent {
    /// Mouse press on a title bar: focus + start a raw drag.
    TitleGrab { id: NodeId, mx: f32, my: f32 },
    /// Mouse press on a resize grip.
    ResizeGrab { id: NodeId, mx: f32, my: f32 },
    PointerMoved { mx: f32, my: f32 },
    PointerReleased,
    CloseWindow(NodeId),
    /// A revealed word was clicked inside a window.
    WordClicked { id: NodeId, word: String },
    /// The window's write button: merge with the nearest neighbor.
    MergeRequested(NodeId),
    /// Clean click on empty canvas (under the 5-unit jitter guard).
    BackgroundClicked,
    CycleBackground,
    ToggleVision,
    RescanCamera,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    store:          NodeStore,
    bg:             BackgroundKind,
    cursor:         VirtualCursor,
    gauge:          DwellGauge,
    reveal:         RevealBoard,
    arbiter:        PointerArbiter,
    viewport:       Viewport,
    camera_status:  CameraStatus,
    vision_enabled: bool,
    rng:            StdRng,

    // ── status message ────────────────────────────────────────────────────
    pub status: String,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Self {
        Self::with_rng(cfg, StdRng::from_entropy())
    }

    pub fn with_rng(cfg: AppConfig, rng: StdRng) -> Self {
        let mut store = NodeStore::new();
        let (cx, cy) = cfg.viewport.center();
        store.create(BOOTSTRAP_TEXT, cx - 150.0, cy - 100.0, 0, None);

        AppState {
            store,
            bg: BackgroundKind::BlissDream,
            cursor: VirtualCursor::centered(cfg.viewport),
            gauge: DwellGauge::new(cfg.viewport.center()),
            reveal: RevealBoard::new(),
            arbiter: PointerArbiter::new(),
            viewport: cfg.viewport,
            camera_status: CameraStatus::Idle,
            vision_enabled: cfg.vision,
            rng,
            status: format!("Ready — \"{}\"", BOOTSTRAP_TEXT),
        }
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn store(&self) -> &NodeStore           { &self.store }
    pub fn bg(&self) -> BackgroundKind          { self.bg }
    pub fn cursor(&self) -> &VirtualCursor      { &self.cursor }
    pub fn reveal(&self) -> &RevealBoard        { &self.reveal }
    pub fn camera_status(&self) -> CameraStatus { self.camera_status }
    pub fn vision_enabled(&self) -> bool        { self.vision_enabled }
    pub fn viewport(&self) -> Viewport          { self.viewport }

    // ── core handlers ─────────────────────────────────────────────────────

    pub fn change_background(&mut self) {
        self.bg = next_background(self.bg, &mut self.rng);
    }

    /// Spawn a child from a clicked word, pulsing the background.
    pub fn spawn(&mut self, word: &str, parent_id: NodeId) {
        if let Some(child) =
            spawn_from_word(&mut self.store, word, parent_id, self.viewport, &mut self.rng)
        {
            self.change_background();
            let text = self.store.get(child).map(|n| n.text.clone()).unwrap_or_default();
            self.status = format!("SPAWN 「{}」 → {} \"{}\"", word, child, text);
        }
    }

    /// Merge with the nearest neighbor, pulsing the background on success.
    pub fn merge(&mut self, source_id: NodeId) {
        match attempt_merge(&mut self.store, source_id) {
            Some(merged) => {
                self.change_background();
                self.status = format!("MERGE → {}", merged);
            }
            None => {
                self.status = "MERGE — no neighbor in range".to_string();
            }
        }
    }

    // ── process one UiEvent; false means quit ─────────────────────────────

    pub fn handle_ui(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::TitleGrab { id, mx, my } => {
                self.arbiter.begin_drag(&mut self.store, id, mx, my);
            }
            UiEvent::ResizeGrab { id, mx, my } => {
                self.arbiter.begin_resize(&mut self.store, id, mx, my);
            }
            UiEvent::PointerMoved { mx, my } => {
                self.arbiter.pointer_moved(&mut self.store, mx, my);
            }
            UiEvent::PointerReleased => self.arbiter.pointer_released(),
            UiEvent::CloseWindow(id) => {
                self.store.close(id);
                self.status = format!("CLOSE {}", id);
            }
            UiEvent::WordClicked { id, word } => {
                if self.reveal.finished(id) {
                    self.spawn(&word, id);
                }
            }
            UiEvent::MergeRequested(id) => self.merge(id),
            UiEvent::BackgroundClicked | UiEvent::CycleBackground => {
                self.change_background();
                self.status = format!("PULSE → {}", self.bg.name());
            }
            UiEvent::ToggleVision => {
                self.vision_enabled = !self.vision_enabled;
                if !self.vision_enabled {
                    self.cursor.release();
                }
                self.status = if self.vision_enabled {
                    "VISION_ENABLED".to_string()
                } else {
                    "VISION_DISABLED".to_string()
                };
            }
            UiEvent::RescanCamera => {
                // The run loop forwards this to the rig; just narrate.
                self.status = "RESCAN_HARDWARE…".to_string();
            }
            UiEvent::Quit => return false,
        }
        true
    }

    // ── vision events ─────────────────────────────────────────────────────

    pub fn handle_vision(&mut self, event: VisionEvent) {
        match event {
            VisionEvent::Status(s) => {
                self.camera_status = s;
                self.status = s.status_text().to_string();
            }
            VisionEvent::Sample { x, y } => self.feed_sample(x, y),
        }
    }

    /// One smoothed cursor position from the rig.
    pub fn feed_sample(&mut self, x: f32, y: f32) {
        if !self.vision_enabled {
            return;
        }
        self.cursor.x = x;
        self.cursor.y = y;

        match self.gauge.update((x, y), self.cursor.is_down) {
            DwellOutcome::Click => {
                self.cursor.progress = self.gauge.progress;
                self.virtual_click();
            }
            DwellOutcome::LockBroken => self.cursor.release(),
            DwellOutcome::Idle => self.cursor.progress = self.gauge.progress,
        }

        // While locked, the cursor is the window's position authority.
        PointerArbiter::virtual_drag(&mut self.store, &self.cursor);
    }

    /// Synthesize a click at the cursor: grab a title bar, extend a word,
    /// or pulse the background.
    fn virtual_click(&mut self) {
        let (cx, cy) = (self.cursor.x, self.cursor.y);
        let hit = self
            .store
            .topmost_at(cx, cy)
            .map(|n| (n.id, n.y, n.full_text.clone()));

        match hit {
            Some((id, top, full_text)) => {
                self.store.focus(id);
                if cy <= top + TITLE_BAR_H {
                    self.cursor.grab(id);
                    self.status = format!("GRAB {}", id);
                } else {
                    let words = split_words(&full_text);
                    if !words.is_empty() && self.reveal.finished(id) {
                        let word = words[self.rng.gen_range(0..words.len())].to_string();
                        self.spawn(&word, id);
                    }
                }
            }
            None => {
                self.change_background();
                self.status = format!("PULSE → {}", self.bg.name());
            }
        }
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self) {
        self.reveal.sync(&self.store);
        self.reveal.tick();
        PointerArbiter::release_stale_lock(&mut self.cursor, &self.store);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full installation.
///
/// Creates the visualizer window, spawns the vision rig (simulated light
/// by default, real webcam with `--features camera`), and drives the
/// event/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), String> {
    let viewport = cfg.viewport;
    let mut vis = Visualizer::new(viewport)?;
    let mut app = AppState::new(cfg);

    // ── light feed: in simulation mode the pointer is the light ──────────
    let (glow_tx, glow_rx) = mpsc::channel::<(f32, f32)>();
    let rig = VisionRig::spawn(make_opener(glow_rx), viewport.width, viewport.height);
    log::info!(
        "[app] canvas {}x{}, vision driver {}",
        viewport.width,
        viewport.height,
        if app.vision_enabled() { "on" } else { "off" }
    );

    while vis.is_open() {
        // 1. Window input → semantic events
        for event in vis.poll_input(&app) {
            match event {
                UiEvent::RescanCamera => {
                    rig.rescan();
                    app.handle_ui(UiEvent::RescanCamera);
                }
                other => {
                    if !app.handle_ui(other) {
                        rig.quit();
                        return Ok(());
                    }
                }
            }
        }

        // 2. Feed the simulated light source (ignored in camera mode —
        //    the receiver is gone and the send just fails).
        if let Some(pos) = vis.normalized_mouse() {
            let _ = glow_tx.send(pos);
        }

        // 3. Drain vision events
        for event in rig.drain_events() {
            app.handle_vision(event);
        }

        // 4. Per-frame logic
        app.tick();

        // 5. Render
        vis.render(&app);
    }

    rig.quit();
    Ok(())
}

#[cfg(not(feature = "camera"))]
fn make_opener(glow_rx: mpsc::Receiver<(f32, f32)>) -> SourceOpener {
    use lumen_track::{CameraError, FrameSource, GlowSource};

    let mut feed = Some(glow_rx);
    Box::new(move || {
        feed.take()
            .map(|rx| Box::new(GlowSource::new(rx)) as Box<dyn FrameSource>)
            .ok_or_else(|| CameraError::Stream("light feed already consumed".into()))
    })
}

#[cfg(feature = "camera")]
fn make_opener(_glow_rx: mpsc::Receiver<(f32, f32)>) -> SourceOpener {
    use lumen_track::camera::CameraSource;
    use lumen_track::FrameSource;

    Box::new(|| CameraSource::open().map(|src| Box::new(src) as Box<dyn FrameSource>))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: NodeId = NodeId(0);

    fn make_app(vision: bool) -> AppState {
        let cfg = AppConfig { viewport: Viewport::new(1280.0, 800.0), vision };
        AppState::with_rng(cfg, StdRng::seed_from_u64(9))
    }

    /// Tick the reveal board until the bootstrap node finishes typing.
    fn finish_reveals(app: &mut AppState) {
        for _ in 0..600 {
            app.tick();
        }
    }

    /// Hold the virtual cursor at one point long enough to click.
    fn dwell_at(app: &mut AppState, x: f32, y: f32) {
        for _ in 0..40 {
            app.feed_sample(x, y);
        }
    }

    #[test]
    fn bootstrap_node_exists() {
        let app = make_app(false);
        let root = app.store().get(ROOT).unwrap();
        assert_eq!(root.full_text, BOOTSTRAP_TEXT);
        assert_eq!(root.depth, 0);
        // Centered around the viewport middle
        assert_eq!((root.x, root.y), (640.0 - 150.0, 400.0 - 100.0));
    }

    #[test]
    fn dwell_on_title_bar_engages_grab_and_focus() {
        let mut app = make_app(true);
        let z_before = app.store().get(ROOT).unwrap().z_index;

        // Bootstrap title band: x 490..710, y 300..332
        dwell_at(&mut app, 500.0, 310.0);

        assert!(app.cursor().is_down);
        assert_eq!(app.cursor().target_id, Some(ROOT));
        assert!(app.store().get(ROOT).unwrap().z_index > z_before);
    }

    #[test]
    fn grabbed_window_follows_the_cursor() {
        let mut app = make_app(true);
        dwell_at(&mut app, 500.0, 310.0);
        assert!(app.cursor().is_down);

        // Drift in small steps so the lock holds
        let mut x = 500.0;
        for _ in 0..5 {
            x += 100.0;
            app.feed_sample(x, 310.0);
        }
        let n = app.store().get(ROOT).unwrap();
        assert!((n.x - (x - n.width / 2.0)).abs() < 1e-3);
        assert!((n.y - (310.0 - 15.0)).abs() < 1e-3);
    }

    #[test]
    fn big_jump_breaks_the_lock() {
        let mut app = make_app(true);
        dwell_at(&mut app, 500.0, 310.0);
        assert!(app.cursor().is_down);

        app.feed_sample(1100.0, 310.0);
        assert!(!app.cursor().is_down);
        assert_eq!(app.cursor().target_id, None);
        assert_eq!(app.cursor().progress, 0.0);
    }

    #[test]
    fn word_click_waits_for_reveal() {
        let mut app = make_app(true);
        // Content area of the bootstrap window
        dwell_at(&mut app, 500.0, 400.0);
        assert_eq!(app.store().len(), 1, "spawned before reveal finished");

        finish_reveals(&mut app);
        dwell_at(&mut app, 500.0, 400.0);
        assert_eq!(app.store().len(), 2);

        let child = app.store().iter().find(|n| n.id != ROOT).unwrap();
        assert_eq!(child.parent_id, Some(ROOT));
        assert_eq!(child.depth, 1);
    }

    #[test]
    fn word_click_pulses_background() {
        let mut app = make_app(true);
        finish_reveals(&mut app);
        let bg_before = app.bg();
        dwell_at(&mut app, 500.0, 400.0);
        assert_ne!(app.bg(), bg_before);
    }

    #[test]
    fn empty_click_pulses_background_only() {
        let mut app = make_app(true);
        let bg_before = app.bg();
        dwell_at(&mut app, 100.0, 700.0);
        assert_ne!(app.bg(), bg_before);
        assert_eq!(app.store().len(), 1);
        assert!(!app.cursor().is_down);
    }

    #[test]
    fn samples_ignored_while_vision_disabled() {
        let mut app = make_app(false);
        let bg_before = app.bg();
        dwell_at(&mut app, 100.0, 700.0);
        assert_eq!(app.bg(), bg_before);
        assert_eq!(app.cursor().progress, 0.0);
    }

    #[test]
    fn toggling_vision_off_releases_the_grab() {
        let mut app = make_app(true);
        dwell_at(&mut app, 500.0, 310.0);
        assert!(app.cursor().is_down);
        app.handle_ui(UiEvent::ToggleVision);
        assert!(!app.cursor().is_down);
    }

    #[test]
    fn closing_the_locked_node_clears_the_lock() {
        let mut app = make_app(true);
        dwell_at(&mut app, 500.0, 310.0);
        assert!(app.cursor().is_down);

        app.handle_ui(UiEvent::CloseWindow(ROOT));
        app.tick();
        assert!(!app.cursor().is_down);
        assert_eq!(app.cursor().target_id, None);
    }

    #[test]
    fn merge_event_combines_neighbors() {
        let mut app = make_app(false);
        // Park a second node on top of the bootstrap one
        let other = app.store.create("是否聽見回音", 490.0, 300.0, 1, None);
        app.handle_ui(UiEvent::MergeRequested(other));

        assert_eq!(app.store().len(), 1);
        let merged = app.store().iter().next().unwrap();
        assert!(merged.full_text.contains(BOOTSTRAP_TEXT));
        assert!(merged.full_text.contains("是否聽見回音"));
        assert_eq!(merged.depth, 2);
    }

    #[test]
    fn word_clicked_event_is_reveal_gated() {
        let mut app = make_app(false);
        app.handle_ui(UiEvent::WordClicked { id: ROOT, word: "你".to_string() });
        assert_eq!(app.store().len(), 1);

        finish_reveals(&mut app);
        app.handle_ui(UiEvent::WordClicked { id: ROOT, word: "你".to_string() });
        assert_eq!(app.store().len(), 2);
    }

    #[test]
    fn camera_status_transitions_surface() {
        let mut app = make_app(true);
        assert_eq!(app.camera_status(), CameraStatus::Idle);
        app.handle_vision(VisionEvent::Status(CameraStatus::Error));
        assert_eq!(app.camera_status(), CameraStatus::Error);
        assert!(app.status.contains("DENIED"));
        app.handle_vision(VisionEvent::Status(CameraStatus::Active));
        assert_eq!(app.camera_status(), CameraStatus::Active);
    }

    #[test]
    fn quit_event_stops_the_loop() {
        let mut app = make_app(false);
        assert!(app.handle_ui(UiEvent::CycleBackground));
        assert!(!app.handle_ui(UiEvent::Quit));
    }
}
