//! Software-rendered desktop using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  [generative background: one of 8 effect modes]              │
//! │        ┌─ Poetry.exe ──────────────[✕]─┐                     │
//! │        │ WRITE                         │   ┌─ Poetry.exe ─┐  │
//! │        │  你好嗎？▌                    │···│ (links fade   │  │
//! │        │                               │   │  with range) │  │
//! │        └──────────────────────────[◢]──┘   └──────────────┘  │
//! │                                          ┌─ VISION_DRIVER ─┐ │
//! │                                          │ status / rescan │ │
//! ├──────────────────────────────────────────┴─────────────────┴─┤
//! │ START │ ● VISION │ NODES: 4 │ status line                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The visualizer owns raw input too: it translates mouse and keyboard
//! into the semantic [`UiEvent`]s the app state consumes, using the same
//! chrome layout it paints.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use poem_graph::lexicon::{word_spans, WordSpan};
use poem_graph::{font_size, BackgroundKind, NodeStore, PoetryNode, Viewport};

use crate::app::{AppState, UiEvent};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const TASKBAR_H:   i32 = 40;
const MENU_H:      f32 = 18.0;
const CONTENT_PAD: f32 = 12.0;
const CONTENT_TOP: f32 = 50.0;  // title bar + menu bar
const STATUS_H:    f32 = 24.0;
const GRIP:        f32 = 16.0;

/// Background clicks tolerate this much jitter between press and release.
const CLICK_SLOP: f32 = 5.0;

/// Links between windows fade out at this center distance.
const LINK_RANGE: f32 = 450.0;

// ── palette ─────────────────────────────────────────────────────────────────

const TITLE_BLUE_A:  u32 = 0xFF0058E3;
const TITLE_BLUE_B:  u32 = 0xFF27C6FF;
const TITLE_GREEN_A: u32 = 0xFF16A34A;
const TITLE_GREEN_B: u32 = 0xFF4ADE80;
const FACE:          u32 = 0xFFECE9D8;
const FACE_EDGE:     u32 = 0xFF9C9A8A;
const PAPER:         u32 = 0xFFFFFFFF;
const INK:           u32 = 0xFF1A1A1A;
const LINK_BLUE:     u32 = 0xFF0000EE;
const PUNCT_GRAY:    u32 = 0xFF888888;
const CLOSE_RED:     u32 = 0xFFE96E5C;
const TASK_BLUE_A:   u32 = 0xFF245EDB;
const TASK_BLUE_B:   u32 = 0xFF0D368B;
const START_GREEN:   u32 = 0xFF2FA82F;
const LINK_GREEN:    u32 = 0xFF39FF14;
const CURSOR_GREEN:  u32 = 0xFF4ADE80;

// ════════════════════════════════════════════════════════════════════════════
// Window chrome rectangles
// ════════════════════════════════════════════════════════════════════════════

fn close_rect(n: &PoetryNode) -> (f32, f32, f32, f32) {
    (n.x + n.width - 26.0, n.y + 6.0, 20.0, 20.0)
}

fn write_rect(n: &PoetryNode) -> (f32, f32, f32, f32) {
    (n.x + 8.0, n.y + 34.0, 64.0, 14.0)
}

fn grip_rect(n: &PoetryNode) -> (f32, f32, f32, f32) {
    (n.x + n.width - GRIP, n.y + n.height - GRIP, GRIP, GRIP)
}

fn in_rect(x: f32, y: f32, r: (f32, f32, f32, f32)) -> bool {
    x >= r.0 && x <= r.0 + r.2 && y >= r.1 && y <= r.1 + r.3
}

// ════════════════════════════════════════════════════════════════════════════
// Word layout — shared by painting and hit-testing
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct WordBox {
    /// Index into the span list this box belongs to.
    pub span: usize,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Flow-wrap the spans of a node's text through its content area.
pub fn layout_spans(node: &PoetryNode, spans: &[WordSpan]) -> Vec<WordBox> {
    let font   = font_size(node.depth);
    let cell_w = font * 0.9;
    let line_h = font * 1.5;
    let x0     = node.x + CONTENT_PAD;
    let right  = node.x + node.width - CONTENT_PAD;

    let mut cx = x0;
    let mut cy = node.y + CONTENT_TOP;
    let mut out = Vec::with_capacity(spans.len());
    for (i, span) in spans.iter().enumerate() {
        let chars = (span.char_end - span.char_start) as f32;
        let w = chars * cell_w;
        if cx + w > right && cx > x0 {
            cx = x0;
            cy += line_h;
        }
        out.push(WordBox { span: i, x: cx, y: cy, w, h: line_h });
        cx += w;
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
    frame:  u64,

    mouse_was_down: bool,
    last_mouse:     (f32, f32),
    bg_press:       Option<(f32, f32)>,
}

impl Visualizer {
    pub fn new(viewport: Viewport) -> Result<Self, String> {
        let width = viewport.width as usize;
        let height = viewport.height as usize;
        let mut window = Window::new(
            "Hyperlink Poetry — 超連結詩意空間",
            width,
            height,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![0xFF008080; width * height],
            width,
            height,
            frame: 0,
            mouse_was_down: false,
            last_mouse: (0.0, 0.0),
            bg_press: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Pointer position scaled into `[0,1]²` — the simulated light feed.
    pub fn normalized_mouse(&self) -> Option<(f32, f32)> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x / self.width as f32, y / self.height as f32))
    }

    // ── input translation ────────────────────────────────────────────────

    /// Poll raw input and translate it into semantic events.
    pub fn poll_input(&mut self, app: &AppState) -> Vec<UiEvent> {
        let mut events = Vec::new();
        if !self.window.is_open() {
            events.push(UiEvent::Quit);
            return events;
        }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No) {
            events.push(UiEvent::Quit);
        }
        if self.window.is_key_pressed(Key::V, KeyRepeat::No) {
            events.push(UiEvent::ToggleVision);
        }
        if self.window.is_key_pressed(Key::B, KeyRepeat::No) {
            events.push(UiEvent::CycleBackground);
        }
        if self.window.is_key_pressed(Key::R, KeyRepeat::No) {
            events.push(UiEvent::RescanCamera);
        }

        let (mx, my) = self
            .window
            .get_mouse_pos(MouseMode::Clamp)
            .unwrap_or(self.last_mouse);
        let down = self.window.get_mouse_down(MouseButton::Left);

        if down && !self.mouse_was_down {
            self.press(app, mx, my, &mut events);
        } else if down && (mx, my) != self.last_mouse {
            events.push(UiEvent::PointerMoved { mx, my });
        } else if !down && self.mouse_was_down {
            events.push(UiEvent::PointerReleased);
            if let Some((sx, sy)) = self.bg_press.take() {
                let slip = ((mx - sx).powi(2) + (my - sy).powi(2)).sqrt();
                if slip < CLICK_SLOP && app.store().topmost_at(mx, my).is_none() {
                    events.push(UiEvent::BackgroundClicked);
                }
            }
        }

        self.mouse_was_down = down;
        self.last_mouse = (mx, my);
        events
    }

    fn press(&mut self, app: &AppState, mx: f32, my: f32, events: &mut Vec<UiEvent>) {
        let Some(node) = app.store().topmost_at(mx, my) else {
            self.bg_press = Some((mx, my));
            return;
        };
        let id = node.id;

        if in_rect(mx, my, close_rect(node)) {
            events.push(UiEvent::CloseWindow(id));
        } else if in_rect(mx, my, grip_rect(node)) {
            events.push(UiEvent::ResizeGrab { id, mx, my });
        } else if in_rect(mx, my, write_rect(node)) {
            if app.reveal().finished(id) {
                events.push(UiEvent::MergeRequested(id));
            }
        } else if node.in_title_bar(mx, my) {
            events.push(UiEvent::TitleGrab { id, mx, my });
        } else if app.reveal().finished(id) {
            let spans = word_spans(&node.full_text);
            for b in layout_spans(node, &spans) {
                let span = &spans[b.span];
                if !span.separator && in_rect(mx, my, (b.x, b.y, b.w, b.h)) {
                    events.push(UiEvent::WordClicked { id, word: span.text.clone() });
                    break;
                }
            }
        }
    }

    // ── rendering ────────────────────────────────────────────────────────

    pub fn render(&mut self, app: &AppState) {
        self.frame += 1;

        match app.bg() {
            BackgroundKind::Noise         => self.bg_noise(),
            BackgroundKind::ColorWaves    => self.bg_color_waves(),
            BackgroundKind::SharpWaves    => self.bg_sharp_waves(),
            BackgroundKind::Circles       => self.bg_circles(),
            BackgroundKind::DotGrid       => self.bg_dot_grid(),
            BackgroundKind::ShadowFigures => self.bg_shadow_figures(),
            BackgroundKind::DelaunayMesh  => self.bg_delaunay_mesh(),
            BackgroundKind::BlissDream    => self.bg_bliss_dream(),
        }

        self.draw_connections(app.store());

        for node in app.store().paint_order() {
            let locked = app.vision_enabled() && app.cursor().locked_on(node.id);
            let visible = app.reveal().visible(node.id);
            let finished = app.reveal().finished(node.id);
            self.draw_window(node, visible, finished, locked);
        }

        self.draw_vision_panel(app);
        if app.vision_enabled() {
            self.draw_virtual_cursor(app);
        }
        self.draw_taskbar(app);

        self.window
            .update_with_buffer(&self.buf, self.width, self.height)
            .ok();
    }

    // ── one window ───────────────────────────────────────────────────────

    fn draw_window(&mut self, node: &PoetryNode, visible: usize, finished: bool, locked: bool) {
        let (x, y) = (node.x as i32, node.y as i32);
        let (w, h) = (node.width as i32, node.height as i32);
        let (grad_a, grad_b) = if locked {
            (TITLE_GREEN_A, TITLE_GREEN_B)
        } else {
            (TITLE_BLUE_A, TITLE_BLUE_B)
        };

        // Frame and face
        self.fill_rect(x - 3, y - 3, w + 6, h + 6, grad_a);
        self.fill_rect(x, y, w, h, FACE);

        // Title bar gradient, left to right
        for col in 0..w {
            let t = col as f32 / w.max(1) as f32;
            self.fill_rect(x + col, y, 1, 32, blend(grad_a, grad_b, t));
        }
        let title = if locked { "POETRY.EXE (LOCKED)" } else { "POETRY.EXE" };
        self.draw_label(title, x + 8, y + 12, PAPER, 2);

        // Close button
        let cr = close_rect(node);
        self.fill_rect(cr.0 as i32, cr.1 as i32, cr.2 as i32, cr.3 as i32, CLOSE_RED);
        self.draw_label("X", cr.0 as i32 + 7, cr.1 as i32 + 5, PAPER, 2);

        // Menu bar with the write/merge button
        self.fill_rect(x, y + 32, w, MENU_H as i32, FACE);
        self.fill_rect(x, y + 32 + MENU_H as i32 - 1, w, 1, FACE_EDGE);
        let wr = write_rect(node);
        let write_bg = if finished { 0xFFD7F5D7 } else { 0xFFDDDBCC };
        let write_ink = if finished { 0xFF1E7A1E } else { 0xFFA0A0A0 };
        self.fill_rect(wr.0 as i32, wr.1 as i32, wr.2 as i32, wr.3 as i32, write_bg);
        self.draw_label("WRITE", wr.0 as i32 + 6, wr.1 as i32 + 2, write_ink, 2);

        // Content paper
        let content_h = h - CONTENT_TOP as i32 - STATUS_H as i32;
        self.fill_rect(x + 4, y + CONTENT_TOP as i32 - 2, w - 8, content_h, PAPER);

        self.draw_poem_text(node, visible, finished);

        // Status bar and resize grip
        let sy = y + h - STATUS_H as i32;
        self.fill_rect(x, sy, w, STATUS_H as i32, FACE);
        let status = if finished { "HYPERLINK: ACTIVE" } else { "THINKING..." };
        self.draw_label(status, x + 8, sy + 8, 0xFF707070, 1);
        for k in 0..3 {
            let off = 4 * k + 4;
            self.draw_line(
                x + w - 4 - off, y + h - 4,
                x + w - 4, y + h - 4 - off,
                FACE_EDGE, None,
            );
        }
    }

    /// Paint the revealed prefix of the node's text, word-wrapped, with a
    /// blinking caret while still typing.
    fn draw_poem_text(&mut self, node: &PoetryNode, visible: usize, finished: bool) {
        let font   = font_size(node.depth);
        let cell_w = font * 0.9;
        let spans  = word_spans(&node.full_text);
        let boxes  = layout_spans(node, &spans);
        let bottom = node.y + node.height - STATUS_H;

        let mut caret: Option<(f32, f32)> = None;
        for b in &boxes {
            if b.y + b.h > bottom {
                break; // clipped by the window; resize to see more
            }
            let span = &spans[b.span];
            let color = if span.separator {
                PUNCT_GRAY
            } else if finished {
                LINK_BLUE
            } else {
                INK
            };
            for (k, c) in span.text.chars().enumerate() {
                let idx = span.char_start + k;
                let cx = b.x + k as f32 * cell_w;
                if idx >= visible {
                    if caret.is_none() {
                        caret = Some((cx, b.y));
                    }
                    break;
                }
                self.draw_poem_char(c, cx, b.y, cell_w, font, color);
            }
            if caret.is_some() {
                break;
            }
        }

        if !finished && (self.frame / 24) % 2 == 0 {
            let (cx, cy) = caret.unwrap_or_else(|| {
                boxes
                    .last()
                    .map(|b| (b.x + b.w, b.y))
                    .unwrap_or((node.x + CONTENT_PAD, node.y + CONTENT_TOP))
            });
            self.fill_rect(cx as i32, cy as i32, 2, (font * 1.2) as i32, TITLE_BLUE_A);
        }
    }

    /// One character cell.  ASCII goes through the bitmap font; CJK gets a
    /// woven block whose pattern derives from the codepoint, so distinct
    /// characters stay distinguishable even without a real font.
    fn draw_poem_char(&mut self, c: char, x: f32, y: f32, cell_w: f32, font: f32, color: u32) {
        if c.is_ascii() {
            let scale = ((font / 7.0) as usize).max(1);
            self.draw_label(&c.to_string(), x as i32 + 1, y as i32 + 2, color, scale);
            return;
        }

        let (bx, by) = (x as i32 + 1, y as i32 + 2);
        let (bw, bh) = ((cell_w as i32 - 2).max(4), font as i32);
        self.draw_border(bx, by, bw, bh, color);

        let cp = c as u32;
        let pattern = cp ^ (cp >> 5) ^ (cp >> 11);
        let (sw, sh) = (bw / 3, bh / 3);
        for row in 0..3 {
            for col in 0..3 {
                if pattern >> (row * 3 + col) & 1 == 1 {
                    self.fill_rect(
                        bx + 1 + col * sw, by + 1 + row * sh,
                        (sw - 1).max(1), (sh - 1).max(1),
                        color,
                    );
                }
            }
        }
    }

    // ── connection layer ─────────────────────────────────────────────────

    /// Dashed links between nearby windows, fading with distance.  Skipped
    /// when there is nothing to connect or far too much.
    fn draw_connections(&mut self, store: &NodeStore) {
        let nodes: Vec<&PoetryNode> = store.iter().collect();
        if nodes.len() < 2 || nodes.len() > 50 {
            return;
        }
        for (i, a) in nodes.iter().enumerate() {
            let (x1, y1) = a.center();
            for b in nodes.iter().skip(i + 1) {
                let (x2, y2) = b.center();
                let dist = ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt();
                if dist >= LINK_RANGE {
                    continue;
                }
                let strength = (1.0 - dist / LINK_RANGE) * 0.6;
                let color = blend(0xFF003300, LINK_GREEN, strength);
                self.draw_line(
                    x1 as i32, y1 as i32, x2 as i32, y2 as i32,
                    color, Some((4, 8)),
                );
            }
        }
    }

    // ── virtual cursor ───────────────────────────────────────────────────

    fn draw_virtual_cursor(&mut self, app: &AppState) {
        let c = app.cursor();
        let (cx, cy) = (c.x as i32, c.y as i32);
        let r = 20i32;
        let ring = if c.progress > 0.0 || c.is_down { CURSOR_GREEN } else { 0xFFBBBBBB };

        self.draw_circle(cx, cy, r, ring);
        self.draw_circle(cx, cy, r - 1, ring);

        // Charge fill rises from the bottom of the ring
        let fill_top = cy + r - (c.progress * 2.0 * r as f32) as i32;
        for yy in fill_top..(cy + r) {
            let dy = yy - cy;
            let span = ((r * r - dy * dy).max(0) as f32).sqrt() as i32;
            for xx in (cx - span)..(cx + span) {
                let under = self.get_px(xx, yy);
                self.set_px(xx, yy, blend(under, CURSOR_GREEN, 0.4));
            }
        }

        // Pointer tip
        for k in 0..6 {
            self.fill_rect(cx, cy + k, 6 - k, 1, PAPER);
        }
    }

    // ── vision panel ─────────────────────────────────────────────────────

    fn draw_vision_panel(&mut self, app: &AppState) {
        let w = 212i32;
        let h = 52i32;
        let x = self.width as i32 - w - 8;
        let y = self.height as i32 - TASKBAR_H - h - 8;

        self.fill_rect(x - 2, y - 2, w + 4, h + 4, TITLE_BLUE_A);
        self.fill_rect(x, y, w, h, 0xFF101010);
        self.draw_label("VISION_DRIVER.SYS", x + 6, y + 6, PAPER, 1);

        let status = app.camera_status();
        let color = if status.recoverable() { 0xFFFF5544 } else { LINK_GREEN };
        self.draw_label(status.status_text(), x + 6, y + 20, color, 1);
        if status.recoverable() {
            self.draw_label("PRESS R TO RESCAN", x + 6, y + 34, 0xFF888888, 1);
        } else if !app.vision_enabled() {
            self.draw_label("PRESS V TO ENABLE", x + 6, y + 34, 0xFF888888, 1);
        }
    }

    // ── taskbar ──────────────────────────────────────────────────────────

    fn draw_taskbar(&mut self, app: &AppState) {
        let top = self.height as i32 - TASKBAR_H;
        for row in 0..TASKBAR_H {
            let t = row as f32 / TASKBAR_H as f32;
            self.fill_rect(0, top + row, self.width as i32, 1, blend(TASK_BLUE_A, TASK_BLUE_B, t));
        }

        self.fill_rect(4, top + 6, 74, TASKBAR_H - 12, START_GREEN);
        self.draw_label("START", 14, top + 14, PAPER, 2);

        let vision = if app.vision_enabled() { "VISION ON " } else { "VISION OFF" };
        self.draw_label(vision, 96, top + 16, PAPER, 1);
        self.draw_label(&format!("NODES: {}", app.store().len()), 180, top + 16, PAPER, 1);
        self.draw_label(&app.status, 260, top + 16, 0xFFCCDDFF, 1);
        self.draw_label("V=VISION B=BACKGROUND R=RESCAN Q=QUIT", 4, top - 12, 0xFFDDDDDD, 1);
    }

    // ── background effects ───────────────────────────────────────────────

    fn bg_noise(&mut self) {
        let t = self.frame as u32;
        for y in (0..self.height).step_by(2) {
            for x in (0..self.width).step_by(2) {
                let v = (hash2(x as u32, y as u32, t) & 0x3F) as u32 + 0x20;
                let c = 0xFF000000 | (v << 16) | (v << 8) | v;
                self.fill_rect(x as i32, y as i32, 2, 2, c);
            }
        }
    }

    fn bg_color_waves(&mut self) {
        let t = self.frame as f32 * 0.03;
        for y in 0..self.height {
            let phase = (y as f32 * 0.02 + t).sin() * 0.5 + 0.5;
            let c = blend(0xFF1B2A6B, 0xFF46C2CB, phase);
            self.fill_rect(0, y as i32, self.width as i32, 1, c);
        }
    }

    fn bg_sharp_waves(&mut self) {
        let t = self.frame as f32 * 0.05;
        for y in 0..self.height {
            let tri = ((y as f32 * 0.05 + t) % 2.0 - 1.0).abs(); // triangle wave
            let band = (tri * 4.0) as u32 % 4;
            let c = [0xFF0F2027, 0xFF203A43, 0xFF2C5364, 0xFF3C6E71][band as usize];
            self.fill_rect(0, y as i32, self.width as i32, 1, c);
        }
    }

    fn bg_circles(&mut self) {
        self.buf.fill(0xFF101828);
        let (cx, cy) = (self.width as i32 / 2, self.height as i32 / 2);
        let spread = (self.frame as i32 * 2) % 60;
        let mut r = spread;
        while r < self.width as i32 {
            let fade = 1.0 - r as f32 / self.width as f32;
            self.draw_circle(cx, cy, r, blend(0xFF101828, 0xFF7FB4FF, fade * 0.8));
            r += 60;
        }
    }

    fn bg_dot_grid(&mut self) {
        self.buf.fill(0xFF141414);
        let pulse = ((self.frame as f32 * 0.08).sin() * 2.0 + 3.0) as i32;
        let mut y = 20;
        while y < self.height as i32 - TASKBAR_H {
            let mut x = 20;
            while x < self.width as i32 {
                self.fill_rect(x - pulse / 2, y - pulse / 2, pulse, pulse, 0xFF3A7CA5);
                x += 40;
            }
            y += 40;
        }
    }

    fn bg_shadow_figures(&mut self) {
        for y in 0..self.height {
            let t = y as f32 / self.height as f32;
            self.fill_rect(0, y as i32, self.width as i32, 1, blend(0xFF2B2118, 0xFF0B0805, t));
        }
        // Tall silhouettes drifting slowly
        for k in 0..7u32 {
            let seed = hash2(k, 77, 0) % 1000;
            let drift = ((self.frame as f32 * 0.002 + k as f32).sin() * 40.0) as i32;
            let x = (seed as i32 * self.width as i32 / 1000) + drift;
            let fw = 46 + (seed % 30) as i32;
            let fh = self.height as i32 * 2 / 3;
            self.fill_rect(x, self.height as i32 - TASKBAR_H - fh, fw, fh, 0xFF050505);
            self.fill_rect(x + fw / 2 - 8, self.height as i32 - TASKBAR_H - fh - 20, 16, 20, 0xFF050505);
        }
    }

    fn bg_delaunay_mesh(&mut self) {
        self.buf.fill(0xFF0D1117);
        // A fixed scatter of points, gently orbiting; each links to its
        // neighbors within range — a cheap mesh, not a true triangulation.
        let mut pts = [(0i32, 0i32); 24];
        for (k, p) in pts.iter_mut().enumerate() {
            let seed = hash2(k as u32, 13, 0);
            let base_x = (seed % 1000) as f32 / 1000.0 * self.width as f32;
            let base_y = ((seed >> 10) % 1000) as f32 / 1000.0 * self.height as f32;
            let a = self.frame as f32 * 0.01 + k as f32;
            *p = ((base_x + a.cos() * 30.0) as i32, (base_y + a.sin() * 30.0) as i32);
        }
        for (i, &(x1, y1)) in pts.iter().enumerate() {
            for &(x2, y2) in pts.iter().skip(i + 1) {
                let d2 = (x1 - x2).pow(2) + (y1 - y2).pow(2);
                if d2 < 260 * 260 {
                    let fade = 1.0 - d2 as f32 / (260.0 * 260.0);
                    self.draw_line(x1, y1, x2, y2, blend(0xFF0D1117, 0xFF58A6FF, fade), None);
                }
            }
            self.fill_rect(x1 - 2, y1 - 2, 4, 4, 0xFF58A6FF);
        }
    }

    fn bg_bliss_dream(&mut self) {
        let horizon = self.height * 3 / 5;
        for y in 0..self.height {
            let c = if y < horizon {
                blend(0xFF3E9BFF, 0xFFBEE3FF, y as f32 / horizon as f32)
            } else {
                blend(0xFF58B052, 0xFF2E7030, (y - horizon) as f32 / (self.height - horizon) as f32)
            };
            self.fill_rect(0, y as i32, self.width as i32, 1, c);
        }
        // Rolling hill crest
        for x in 0..self.width {
            let crest = horizon as f32 - (x as f32 * 0.004).sin() * 40.0;
            let top = crest as i32;
            self.fill_rect(x as i32, top, 1, horizon as i32 + 60 - top, 0xFF58B052);
        }
    }

    // ── primitive drawing helpers ────────────────────────────────────────

    fn set_px(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn get_px(&self, x: i32, y: i32) -> u32 {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize]
        } else {
            0xFF000000
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for row in y0..y1 {
            let base = row as usize * self.width;
            for col in x0..x1 {
                self.buf[base + col as usize] = color;
            }
        }
    }

    fn draw_border(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        self.fill_rect(x, y, w, 1, color);
        self.fill_rect(x, y + h - 1, w, 1, color);
        self.fill_rect(x, y, 1, h, color);
        self.fill_rect(x + w - 1, y, 1, h, color);
    }

    /// DDA line; `dash` is an (on, off) pixel pattern.
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32, dash: Option<(u32, u32)>) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        let dx = (x1 - x0) as f32 / steps as f32;
        let dy = (y1 - y0) as f32 / steps as f32;
        let mut x = x0 as f32;
        let mut y = y0 as f32;
        for s in 0..=steps {
            let lit = match dash {
                Some((on, off)) => (s as u32) % (on + off) < on,
                None => true,
            };
            if lit {
                self.set_px(x as i32, y as i32, color);
            }
            x += dx;
            y += dy;
        }
    }

    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        // Midpoint circle
        let mut x = r;
        let mut y = 0;
        let mut err = 1 - r;
        while x >= y {
            for &(px, py) in &[
                (cx + x, cy + y), (cx - x, cy + y), (cx + x, cy - y), (cx - x, cy - y),
                (cx + y, cy + x), (cx - y, cy + x), (cx + y, cy - x), (cx - y, cy - x),
            ] {
                self.set_px(px, py, color);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Bitmap-font label, uppercased, integer-scaled.
    fn draw_label(&mut self, text: &str, x: i32, y: i32, color: u32, scale: usize) {
        let s = scale.max(1) as i32;
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch.to_ascii_uppercase());
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3i32 {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * s, y + row as i32 * s, s, s, color);
                    }
                }
            }
            cx += 4 * s;
            if cx >= self.width as i32 {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font (uppercase + digits + a little punctuation)
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '…' => [0b000, 0b000, 0b000, 0b000, 0b111],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b010, 0b101, 0b010, 0b000], // fallback diamond
    }
}

/// Alpha-blend two ARGB colors.  `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >> 8) & 0xFF;  let bg = (b >> 8) & 0xFF;
    let ab = a & 0xFF;         let bb = b & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// Small integer hash for procedural textures.
fn hash2(x: u32, y: u32, t: u32) -> u32 {
    let mut h = x.wrapping_mul(374_761_393) ^ y.wrapping_mul(668_265_263) ^ t.wrapping_mul(2_246_822_519);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use poem_graph::NodeStore;

    fn sample_node(text: &str, w: f32) -> PoetryNode {
        let mut store = NodeStore::new();
        let id = store.create(text, 100.0, 100.0, 0, None);
        store.update_size(id, w, 300.0);
        store.get(id).unwrap().clone()
    }

    #[test]
    fn layout_wraps_at_content_edge() {
        let node = sample_node("思緒是一種超連結，轉瞬即現。", 220.0);
        let spans = word_spans(&node.full_text);
        let boxes = layout_spans(&node, &spans);

        assert_eq!(boxes.len(), spans.len());
        // First box starts at the content origin
        assert_eq!(boxes[0].x, node.x + CONTENT_PAD);
        assert_eq!(boxes[0].y, node.y + CONTENT_TOP);
        // Something wrapped onto a second line
        assert!(boxes.iter().any(|b| b.y > boxes[0].y));
        // Nothing escapes the left edge
        assert!(boxes.iter().all(|b| b.x >= node.x + CONTENT_PAD));
    }

    #[test]
    fn layout_keeps_one_liner_on_one_line() {
        let node = sample_node("你好嗎？", 400.0);
        let spans = word_spans(&node.full_text);
        let boxes = layout_spans(&node, &spans);
        assert!(boxes.iter().all(|b| b.y == boxes[0].y));
    }

    #[test]
    fn word_boxes_are_hit_testable() {
        let node = sample_node("你好嗎？", 400.0);
        let spans = word_spans(&node.full_text);
        let boxes = layout_spans(&node, &spans);

        // A point inside the first word's box resolves to that span
        let b = &boxes[0];
        assert!(in_rect(b.x + 2.0, b.y + 2.0, (b.x, b.y, b.w, b.h)));
        assert!(!spans[b.span].separator);
    }

    #[test]
    fn chrome_rects_sit_inside_the_window() {
        let node = sample_node("你好嗎？", 300.0);
        for r in [close_rect(&node), write_rect(&node), grip_rect(&node)] {
            assert!(r.0 >= node.x && r.0 + r.2 <= node.x + node.width);
            assert!(r.1 >= node.y && r.1 + r.3 <= node.y + node.height);
        }
        // Close lives in the title band, grip in the bottom corner
        assert!(close_rect(&node).1 < node.y + 32.0);
        assert!(grip_rect(&node).1 > node.y + node.height - 20.0);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn glyphs_cover_the_ui_strings() {
        for s in ["POETRY.EXE", "WRITE", "START", "NODES: 12", "VISION_DRIVER.SYS"] {
            for c in s.chars() {
                // Every UI character has a real glyph, not the fallback
                if c != ' ' {
                    assert_ne!(char_glyph(c), char_glyph('\u{FFFD}'), "missing glyph for {c}");
                }
            }
        }
    }
}
