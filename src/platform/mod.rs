//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Frame deltas fed to the simulation
//! - JS bindings (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::clamp_dt;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed handed in from JS: a positive, finite value is used as-is,
/// anything else picks a fresh seed from the wall clock
pub fn seed_or_clock(seed: f64) -> u64 {
    if seed.is_finite() && seed >= 1.0 {
        seed as u64
    } else {
        now_ms() as u64
    }
}

/// Turns host frame timestamps into clamped simulation deltas.
///
/// A backgrounded tab can hand us a multi-second gap; the simulation never
/// catches up on it.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta (seconds) since the previous call; zero on the first frame
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        clamp_dt(dt)
    }

    /// Forget the last timestamp (after a pause or focus loss)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_FRAME_DT;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(1000.0), 0.0);
        assert!((clock.advance(1016.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_long_gap_clamped() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        assert_eq!(clock.advance(60_000.0), MAX_FRAME_DT);
        // Clock going backwards yields no time
        assert_eq!(clock.advance(59_000.0), 0.0);
    }

    #[test]
    fn test_seed_or_clock() {
        assert_eq!(seed_or_clock(42.0), 42);
        let before = now_ms() as u64;
        for seed in [0.0, -3.0, 0.5, f64::NAN] {
            assert!(seed_or_clock(seed) >= before);
        }
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        clock.reset();
        assert_eq!(clock.advance(500.0), 0.0);
    }
}
