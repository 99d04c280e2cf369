//! Background effect modes and the "pulse" selection.
//!
//! Spawns, merges, and clicks on empty canvas all pulse the background:
//! a uniform pick among the other seven modes, so the mode always visibly
//! changes.

use rand::Rng;

// ════════════════════════════════════════════════════════════════════════════
// BackgroundKind
// ════════════════════════════════════════════════════════════════════════════

/// The eight generative background effects.  Discriminants are part of the
/// renderer contract and stay stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BackgroundKind {
    Noise         = 0,
    ColorWaves    = 1,
    SharpWaves    = 2,
    Circles       = 3,
    DotGrid       = 4,
    ShadowFigures = 5,
    DelaunayMesh  = 6,
    BlissDream    = 7,
}

impl BackgroundKind {
    pub const ALL: [BackgroundKind; 8] = [
        BackgroundKind::Noise,
        BackgroundKind::ColorWaves,
        BackgroundKind::SharpWaves,
        BackgroundKind::Circles,
        BackgroundKind::DotGrid,
        BackgroundKind::ShadowFigures,
        BackgroundKind::DelaunayMesh,
        BackgroundKind::BlissDream,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BackgroundKind::Noise         => "Noise",
            BackgroundKind::ColorWaves    => "ColorWaves",
            BackgroundKind::SharpWaves    => "SharpWaves",
            BackgroundKind::Circles       => "Circles",
            BackgroundKind::DotGrid       => "DotGrid",
            BackgroundKind::ShadowFigures => "ShadowFigures",
            BackgroundKind::DelaunayMesh  => "DelaunayMesh",
            BackgroundKind::BlissDream    => "BlissDream",
        }
    }

    /// Stable wire value, 0–7.
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pulse selection
// ════════════════════════════════════════════════════════════════════════════

/// Pick the next background uniformly among the eight modes, excluding the
/// current one.  Never returns `current`.
pub fn next_background(current: BackgroundKind, rng: &mut impl Rng) -> BackgroundKind {
    loop {
        let next = BackgroundKind::ALL[rng.gen_range(0..BackgroundKind::ALL.len())];
        if next != current {
            return next;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
