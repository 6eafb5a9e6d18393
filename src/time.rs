//! Frame timing for effect updates.
//!
//! The surrounding game loop owns the real clock and hands a raw delta to
//! [`FrameClock::advance`], which turns it into the delta the effects see:
//! sanitised, optionally fixed, scaled, paused and clamped.
//!
//! # Example
//!
//! ```ignore
//! use warchief_fx::time::FrameClock;
//!
//! let mut clock = FrameClock::new(0.1);
//!
//! // In your frame callback:
//! let dt = clock.advance(raw_delta_seconds);
//! effects.update(dt, &view);
//! ```

/// Delta-time sanitiser and frame counter.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    /// Total scaled time in seconds.
    elapsed_secs: f32,
    /// Last delta handed out.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Largest delta ever handed out (avoids huge steps after a stall).
    max_delta: f32,
    /// Whether time is paused.
    paused: bool,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
}

impl FrameClock {
    /// Create a clock that never hands out more than `max_delta` seconds.
    pub fn new(max_delta: f32) -> Self {
        Self {
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            max_delta: sanitize(max_delta),
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Consume one raw frame delta and return the delta to simulate.
    ///
    /// Negative or non-finite deltas count as zero. The frame counter advances
    /// even while paused.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        self.frame_count += 1;

        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        let base = self.fixed_delta.unwrap_or_else(|| sanitize(raw_delta));
        self.delta_secs = (base * self.time_scale).min(self.max_delta);
        self.elapsed_secs += self.delta_secs;
        self.delta_secs
    }

    /// Total simulated time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Delta handed out by the last `advance`.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Pause time progression.
    ///
    /// While paused, `advance()` returns 0 and `elapsed()` stops increasing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set a fixed delta time for deterministic updates.
    ///
    /// Pass `None` to use the raw frame delta.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.map(sanitize);
    }

    /// Set time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed (slow motion)
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = sanitize(scale);
    }

    /// Reset counters, keeping scale, pause and fixed delta settings.
    pub fn reset(&mut self) {
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.1)
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
