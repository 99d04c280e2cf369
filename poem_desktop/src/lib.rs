//! # poem_desktop
//!
//! A desktop-metaphor poetry installation: draggable windows type out
//! poem fragments, clicking a word spawns a child fragment, and dragging
//! two windows together merges them into one.  A webcam-tracked light
//! source can stand in for the mouse entirely.
//!
//! ## Gesture → Action mapping (vision mode)
//!
//! | Gesture | Action |
//! |---|---|
//! | Move the light | Move the virtual cursor (smoothed) |
//! | Hold still ~1 s over a title bar | Grab the window; it follows the light |
//! | Hold still ~1 s over a revealed word | Spawn a child fragment from it |
//! | Hold still ~1 s over empty canvas | Pulse the background effect |
//! | Jerk away while grabbing | Release the window |
//!
//! ## Keyboard / mouse
//!
//! | Input | Action |
//! |---|---|
//! | Drag title bar | Move window |
//! | Drag bottom-right grip | Resize window |
//! | Click `✕` | Close window |
//! | Click `WRITE` | Merge with the nearest window in range |
//! | Click a revealed word | Spawn a child fragment |
//! | Clean click on empty canvas | Pulse the background |
//! | `V` | Toggle the vision driver |
//! | `B` | Pulse the background |
//! | `R` | Rescan camera hardware |
//! | `Q` | Quit |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the pointer position is synthesized
//!   into camera frames as a bright blob, so the whole tracking pipeline
//!   runs without hardware.
//! * `camera` — **Hardware mode**: tracks the brightest region seen by a
//!   real webcam.

pub mod app;
pub mod arbiter;
pub mod cursor;
pub mod reveal;
pub mod visualizer;
