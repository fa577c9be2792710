//! Frame clock
//!
//! `requestAnimationFrame` hands out millisecond timestamps. The simulation
//! only deals in seconds, so the conversion happens once, here.

use crate::consts::MAX_FRAME_DT;

/// Turns successive frame timestamps into elapsed seconds
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f64) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Seconds since the previous call.
    ///
    /// The first call returns 0 so the opening frame does not integrate the
    /// whole page age. Backwards or non-finite timestamps also yield 0.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        if !now_ms.is_finite() {
            return 0.0;
        }
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0.0;
        };
        let dt = (now_ms - last) / 1000.0;
        if dt <= 0.0 {
            return 0.0;
        }
        if dt > self.max_dt {
            log::debug!("Frame gap of {:.3}s clamped to {:.3}s", dt, self.max_dt);
        }
        dt.min(self.max_dt)
    }

    /// Forget the previous timestamp (e.g. when the loop restarts)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
