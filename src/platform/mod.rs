//! Platform glue
//!
//! The simulation only ever sees frame deltas. Hosts hand this module the
//! timestamps their display loop provides (`requestAnimationFrame`, a native
//! event loop, a fixed-step headless driver) and get clamped deltas back.

use crate::consts::MAX_FRAME_DT_MS;

/// Delta used for the very first frame, before a previous timestamp exists
pub const FIRST_FRAME_DT_MS: f32 = 1000.0 / 60.0;

/// Turns monotonically increasing frame timestamps into clamped deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_time_ms: Option<f64>,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous frame in milliseconds.
    ///
    /// Clamped to `MAX_FRAME_DT_MS` so a backgrounded tab or a debugger pause
    /// does not fast-forward the match. Timestamps that go backwards yield 0.
    pub fn frame(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_time_ms {
            Some(last) => ((now_ms - last).max(0.0) as f32).min(MAX_FRAME_DT_MS),
            None => FIRST_FRAME_DT_MS,
        };
        self.last_time_ms = Some(now_ms);
        self.frames += 1;
        dt
    }

    /// Forget the previous timestamp (after resume or focus regain)
    pub fn reset(&mut self) {
        self.last_time_ms = None;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Wall clock in epoch milliseconds, for high score timestamps
#[cfg(not(target_arch = "wasm32"))]
pub fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
