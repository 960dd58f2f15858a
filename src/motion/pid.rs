//! Discrete PID controller with integral anti-windup.
//!
//! The controller owns no hardware. The caller feeds it an error and the
//! elapsed time each tick and decides what to do with the output.
//!
//! The formula is `output = Kp*error + Ki*integral + Kd*derivative`, with the
//! output clamped to `[out_min, out_max]` and the integral clamped so that
//! `Ki*integral` alone can never exceed the output range.

use serde::{Deserialize, Serialize};

/// Proportional, integral and derivative gains.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 1.2,
            ki: 0.1,
            kd: 0.05,
        }
    }
}

/// PID controller state.
#[derive(Clone, Debug)]
pub struct Pid {
    gains:    PidGains,
    out_min:  f64,
    out_max:  f64,
    integral: f64,
    /// Previous error, `None` until the first update so the derivative term
    /// does not kick on the first sample.
    perror:   Option<f64>,
}

impl Pid {
    /// Creates a controller whose output is clamped to `[out_min, out_max]`.
    pub fn new(gains: PidGains, out_min: f64, out_max: f64) -> Self {
        let (out_min, out_max) = if out_min <= out_max { (out_min, out_max) } else { (out_max, out_min) };
        Self {
            gains,
            out_min,
            out_max,
            integral: 0.0,
            perror: None,
        }
    }

    /// Advances the controller by `dt` seconds with the given error.
    ///
    /// A non-finite error or a non-positive `dt` leaves the internal state
    /// untouched and returns the lower output bound. NaN never reaches the
    /// integrator.
    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        if !error.is_finite() || !dt.is_finite() || dt <= 0.0 {
            return self.out_min;
        }

        let PidGains { kp, ki, kd } = self.gains;

        self.integral += error * dt;
        if ki != 0.0 {
            let i_max = self.out_min.abs().max(self.out_max.abs()) / ki.abs();
            self.integral = self.integral.clamp(-i_max, i_max);
        } else {
            self.integral = 0.0;
        }

        let derror = match self.perror {
            Some(perror) => (error - perror) / dt,
            None => 0.0,
        };
        self.perror = Some(error);

        let u = kp * error + ki * self.integral + kd * derror;
        if u.is_finite() {
            u.clamp(self.out_min, self.out_max)
        } else {
            self.out_min
        }
    }

    /// Clears the integral and derivative memory.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.perror = None;
    }

    pub fn integral(&self) -> f64 { self.integral }
}
