//! Speed ramp controller.
//!
//! A deliberate, time-bounded override of the kernel's speed clamp: the
//! simulation launches with elevated bounds, holds them for a delay, then
//! eases both bounds down to their steady-state values with a cubic
//! ease-out. The result is the "burst outward then settle" opening.
//!
//! This is pure host-side state. The facade samples it once per step and
//! writes the result into the uniform block; it is dropped on dispose and
//! can never tick afterwards.

/// Time-bounded easing of the `(max_speed, min_speed)` clamp pair.
#[derive(Clone, Copy, Debug)]
pub struct SpeedRamp {
    burst: (f32, f32),
    settle: (f32, f32),
    delay: f32,
    duration: f32,
    started_at: Option<f32>,
}

impl SpeedRamp {
    /// A ramp from `burst` down to `settle`, each a `(max, min)` pair.
    /// Holds the burst values for `delay` seconds, then eases over
    /// `duration` seconds.
    pub fn new(burst: (f32, f32), settle: (f32, f32), delay: f32, duration: f32) -> Self {
        Self {
            burst,
            settle,
            delay: delay.max(0.0),
            duration: duration.max(1e-3),
            started_at: None,
        }
    }

    /// The launch ramp: burst at four times the steady-state speeds,
    /// hold for three seconds, settle over one second.
    pub fn launch(settle_max: f32, settle_min: f32) -> Self {
        Self::new(
            (settle_max * 4.0, settle_min * 4.0),
            (settle_max, settle_min),
            3.0,
            1.0,
        )
    }

    /// Sample the `(max, min)` bounds at wall-clock time `now`. The first
    /// call starts the ramp; restarting is a matter of constructing a new
    /// ramp, which resets the clock — the controller itself never
    /// re-arms.
    pub fn sample(&mut self, now: f32) -> (f32, f32) {
        let started = *self.started_at.get_or_insert(now);
        let t = ((now - started - self.delay) / self.duration).clamp(0.0, 1.0);

        // Cubic ease-out
        let eased = 1.0 - (1.0 - t).powi(3);

        (
            self.burst.0 + (self.settle.0 - self.burst.0) * eased,
            self.burst.1 + (self.settle.1 - self.burst.1) * eased,
        )
    }

    /// True once the ramp has fully settled at `now`.
    pub fn finished(&self, now: f32) -> bool {
        match self.started_at {
            Some(started) => now - started >= self.delay + self.duration,
            None => false,
        }
    }
}
