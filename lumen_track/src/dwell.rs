//! Dwell gesture synthesis: sustained stillness becomes a click, a large
//! jump while grabbed breaks the lock.
//!
//! The gauge knows nothing about windows — it only watches displacement
//! between consecutive smoothed positions and reports what the consumer
//! should do.  Hit-testing and grab semantics live with the node state.

/// Displacement under this counts as "still".
pub const STILL_RADIUS: f32 = 20.0;

/// Displacement over this while locked releases the grab.
pub const BREAK_RADIUS: f32 = 150.0;

/// Still ticks needed to charge a click.
pub const CHARGE_TICKS: u32 = 30;

// ════════════════════════════════════════════════════════════════════════════
// DwellOutcome
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DwellOutcome {
    /// Keep going; `progress` carries the click charge.
    Idle,
    /// Stillness held long enough — synthesize a click here.
    Click,
    /// The cursor tore away from a grabbed window — release it.
    LockBroken,
}

// ════════════════════════════════════════════════════════════════════════════
// DwellGauge
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct DwellGauge {
    last:  (f32, f32),
    still: u32,
    /// Click charge in `[0,1]`, rendered as the cursor's fill ring.
    pub progress: f32,
}

impl DwellGauge {
    pub fn new(start: (f32, f32)) -> Self {
        DwellGauge { last: start, still: 0, progress: 0.0 }
    }

    /// Feed one smoothed cursor position.  `locked` tells the gauge a grab
    /// is engaged, which suppresses click charging and arms the breakaway
    /// check instead.
    pub fn update(&mut self, pos: (f32, f32), locked: bool) -> DwellOutcome {
        let dist = ((pos.0 - self.last.0).powi(2) + (pos.1 - self.last.1).powi(2)).sqrt();

        if dist < STILL_RADIUS {
            self.still += 1;
        } else {
            self.still = 0;
            if !locked {
                self.progress = 0.0;
            }
        }

        let outcome = if self.still > CHARGE_TICKS && !locked {
            self.still = 0;
            DwellOutcome::Click
        } else if locked {
            if dist > BREAK_RADIUS {
                self.progress = 0.0;
                DwellOutcome::LockBroken
            } else {
                DwellOutcome::Idle
            }
        } else {
            self.progress = (self.still as f32 / CHARGE_TICKS as f32).min(1.0);
            DwellOutcome::Idle
        };

        self.last = pos;
        outcome
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stillness_charges_then_clicks() {
        let mut g = DwellGauge::new((100.0, 100.0));
        for i in 1..=30 {
            assert_eq!(g.update((100.0, 100.0), false), DwellOutcome::Idle);
            assert!((g.progress - (i as f32 / 30.0).min(1.0)).abs() < 1e-6);
        }
        // 31st still tick fires
        assert_eq!(g.update((100.0, 100.0), false), DwellOutcome::Click);
    }

    #[test]
    fn movement_resets_charge() {
        let mut g = DwellGauge::new((0.0, 0.0));
        for _ in 0..20 {
            g.update((0.0, 0.0), false);
        }
        assert!(g.progress > 0.5);
        g.update((50.0, 0.0), false);
        assert_eq!(g.progress, 0.0);
        // Counter restarted: another 31 still ticks to a click
        for _ in 0..30 {
            assert_ne!(g.update((50.0, 0.0), false), DwellOutcome::Click);
        }
        assert_eq!(g.update((50.0, 0.0), false), DwellOutcome::Click);
    }

    #[test]
    fn small_drift_still_counts_as_still() {
        let mut g = DwellGauge::new((0.0, 0.0));
        let mut fired = false;
        let mut pos = (0.0f32, 0.0f32);
        for _ in 0..40 {
            pos.0 += 10.0; // under STILL_RADIUS per tick
            if g.update(pos, false) == DwellOutcome::Click {
                fired = true;
                break;
            }
        }
        assert!(fired);
    }

    #[test]
    fn locked_never_clicks() {
        let mut g = DwellGauge::new((0.0, 0.0));
        for _ in 0..100 {
            assert_ne!(g.update((0.0, 0.0), true), DwellOutcome::Click);
        }
    }

    #[test]
    fn breakaway_releases_lock() {
        let mut g = DwellGauge::new((0.0, 0.0));
        g.update((0.0, 0.0), true);
        assert_eq!(g.update((100.0, 0.0), true), DwellOutcome::Idle);
        assert_eq!(g.update((400.0, 0.0), true), DwellOutcome::LockBroken);
        assert_eq!(g.progress, 0.0);
    }

    #[test]
    fn wait_31_ticks_not_30() {
        let mut g = DwellGauge::new((5.0, 5.0));
        for tick in 1..=31 {
            let out = g.update((5.0, 5.0), false);
            if tick <= 30 {
                assert_eq!(out, DwellOutcome::Idle, "fired early at tick {}", tick);
            } else {
                assert_eq!(out, DwellOutcome::Click);
            }
        }
    }
}
