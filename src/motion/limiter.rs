//! Acceleration cap on commanded speed.

use std::time::{Duration, Instant};

/// Bounds how fast the commanded translational speed may change.
///
/// Each call to [`RateLimiter::step`] moves the current speed toward the
/// desired speed by at most `max_acceleration * dt`, where `dt` is the real
/// time since the previous step or [`settle`](RateLimiter::settle).
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_acceleration: f64,
    tick_period:      Duration,
    current:          f64,
    last_update:      Option<Instant>,
}

impl RateLimiter {
    /// `max_acceleration` is in speed units per second. `tick_period` is the
    /// `dt` used for the very first step, when there is no previous
    /// timestamp to measure from.
    pub fn new(max_acceleration: f64, tick_period: Duration) -> Self {
        Self {
            max_acceleration: if max_acceleration.is_finite() { max_acceleration.max(0.0) } else { 0.0 },
            tick_period,
            current: 0.0,
            last_update: None,
        }
    }

    /// Moves toward `desired` and returns the new speed.
    ///
    /// If the clock has not advanced since the previous step, the speed is
    /// left as it is. A non-finite `desired` is treated as `0`.
    pub fn step(&mut self, desired: f64, now: Instant) -> f64 {
        let dt = match self.last_update {
            None => self.tick_period,
            Some(last) if now > last => now - last,
            Some(_) => return self.current,
        };
        self.last_update = Some(now);

        let desired = if desired.is_finite() { desired.max(0.0) } else { 0.0 };
        let max_delta = self.max_acceleration * dt.as_secs_f64();
        let delta = (desired - self.current).clamp(-max_delta, max_delta);
        self.current = (self.current + delta).max(0.0);
        self.current
    }

    /// Records the speed the platform actually ended up with at `now`.
    ///
    /// Every tick that does not [`step`](RateLimiter::step) must settle
    /// instead (stop, turn, search, e-stop), so the next ramp starts from
    /// the real speed and measures `dt` from this tick, not from the last
    /// pursuit tick.
    pub fn settle(&mut self, speed: f64, now: Instant) {
        self.current = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        self.last_update = Some(match self.last_update {
            Some(last) if last > now => last,
            _ => now,
        });
    }

    /// Forgets the speed and the last timestamp.
    pub fn reset(&mut self) {
        self.current = 0.0;
        self.last_update = None;
    }

    pub fn current(&self) -> f64 { self.current }

    pub fn last_update(&self) -> Option<Instant> { self.last_update }
}
