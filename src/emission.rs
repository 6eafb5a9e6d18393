//! Emission scheduling for pooled particles.
//!
//! Emission turns a rate (particles per second) and a frame delta into a
//! whole number of spawns. The fractional remainder is carried to the next
//! frame, so a rate of 2.5/s at 60 FPS produces exactly 5 particles every two
//! seconds with no drift.
//!
//! # Policies
//!
//! | Policy | Rate |
//! |--------|------|
//! | [`Emission::Continuous`] | fixed `rate` |
//! | [`Emission::Scaled`] | `max_rate * signal`, signal clamped to `[0, 1]` |
//! | [`Emission::Burst`] | `count` once per [`trigger`](EmissionPolicy::trigger) |
//!
//! # Example
//!
//! ```ignore
//! let mut policy = EmissionPolicy::new(Emission::Scaled { max_rate: 120.0 });
//! let spawns = policy.spawn_count(wind_intensity, dt);
//! ```

/// Fractional spawn credit carried across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmissionState {
    credit: f32,
}

impl EmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fractional credit, always in `[0, 1)`.
    #[inline]
    pub fn credit(&self) -> f32 {
        self.credit
    }

    /// Add `rate * dt` of credit and take out every whole spawn.
    ///
    /// Negative or non-finite inputs contribute nothing.
    pub fn accumulate(&mut self, rate: f32, dt: f32) -> u32 {
        let rate = non_negative(rate);
        let dt = non_negative(dt);
        self.credit += rate * dt;
        if !self.credit.is_finite() {
            // rate * dt overflowed; nothing sensible to carry.
            self.credit = 0.0;
            return u32::MAX;
        }
        if self.credit < 1.0 {
            return 0;
        }
        let whole = self.credit.floor();
        self.credit -= whole;
        if whole >= u32::MAX as f32 {
            u32::MAX
        } else {
            whole as u32
        }
    }

    /// Drop any carried credit.
    pub fn reset(&mut self) {
        self.credit = 0.0;
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// How an effect decides its spawn rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emission {
    /// Spawn at a fixed rate regardless of the driving signal.
    Continuous {
        /// Particles per second.
        rate: f32,
    },
    /// Spawn at `max_rate` scaled by the driving signal.
    Scaled {
        /// Particles per second at full signal.
        max_rate: f32,
    },
    /// Spawn `count` particles in one frame each time the policy is triggered.
    Burst {
        /// Particles per burst.
        count: u32,
    },
}

impl Emission {
    /// Spawn rate for a given driving signal.
    ///
    /// Bursts have no rate.
    pub fn rate(&self, signal: f32) -> f32 {
        match *self {
            Emission::Continuous { rate } => non_negative(rate),
            Emission::Scaled { max_rate } => {
                let signal = if signal.is_finite() {
                    signal.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                non_negative(max_rate) * signal
            }
            Emission::Burst { .. } => 0.0,
        }
    }
}

/// An [`Emission`] policy with its accumulator and burst trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionPolicy {
    emission: Emission,
    state: EmissionState,
    pending_bursts: u32,
}

impl EmissionPolicy {
    pub fn new(emission: Emission) -> Self {
        Self {
            emission,
            state: EmissionState::new(),
            pending_bursts: 0,
        }
    }

    #[inline]
    pub fn emission(&self) -> Emission {
        self.emission
    }

    /// Replace the policy, keeping the carried credit.
    pub fn set_emission(&mut self, emission: Emission) {
        self.emission = emission;
    }

    #[inline]
    pub fn state(&self) -> &EmissionState {
        &self.state
    }

    /// Queue one burst. Ignored by non-burst policies.
    pub fn trigger(&mut self) {
        if matches!(self.emission, Emission::Burst { .. }) {
            self.pending_bursts = self.pending_bursts.saturating_add(1);
        }
    }

    /// Number of particles to spawn this frame.
    pub fn spawn_count(&mut self, signal: f32, dt: f32) -> u32 {
        match self.emission {
            Emission::Burst { count } => {
                let bursts = std::mem::take(&mut self.pending_bursts);
                count.saturating_mul(bursts)
            }
            _ => {
                let rate = self.emission.rate(signal);
                self.state.accumulate(rate, dt)
            }
        }
    }

    /// Drop carried credit and pending bursts.
    pub fn reset(&mut self) {
        self.state.reset();
        self.pending_bursts = 0;
    }
}
