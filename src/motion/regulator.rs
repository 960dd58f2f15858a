//! Distance regulation from apparent target size.
//!
//! The target's apparent size, normalised against the size it has at the
//! desired standoff distance, is the only range cue available. The regulator
//! turns it into a desired approach speed.
//!
//! # Policy
//!
//! - At or past `threshold_near` the target is close enough: desired speed
//!   is `0`.
//! - Otherwise a PID loop with setpoint `threshold_near` produces a factor in
//!   `[0, 1]`, which is multiplied with a shaping factor
//!   `((threshold_near - ratio) / threshold_near) ^ exponent`. With an
//!   exponent above `1` the speed falls off faster than linearly as the
//!   target nears, which is what keeps the approach from overshooting.
//! - The result is mapped onto `[min_speed, max_speed]`.

use super::pid::{Pid, PidGains};

/// Maps a normalised size ratio to a desired speed magnitude.
#[derive(Clone, Debug)]
pub struct DistanceRegulator {
    pid:            Pid,
    threshold_near: f64,
    exponent:       f64,
    min_speed:      f64,
    max_speed:      f64,
}

impl DistanceRegulator {
    pub fn new(gains: PidGains, threshold_near: f64, exponent: f64, min_speed: u16, max_speed: u16) -> Self {
        Self {
            pid: Pid::new(gains, 0.0, 1.0),
            threshold_near,
            exponent: if exponent.is_finite() { exponent.max(1.0) } else { 1.0 },
            min_speed: min_speed.min(max_speed) as f64,
            max_speed: max_speed.max(min_speed) as f64,
        }
    }

    /// Computes the desired speed for `ratio_proportion` after `dt` seconds.
    ///
    /// Returns `0.0` once the target is near. The PID memory is cleared at
    /// that point so a long hold does not leave a latent integral behind.
    pub fn regulate(&mut self, ratio_proportion: f64, dt: f64) -> f64 {
        let ratio = if ratio_proportion.is_finite() { ratio_proportion.max(0.0) } else { 0.0 };
        if self.threshold_near <= 0.0 || ratio >= self.threshold_near {
            self.pid.reset();
            return 0.0;
        }

        let error = self.threshold_near - ratio;
        let pid_out = self.pid.update(error, dt);
        let shaped = self.shape(ratio);

        let speed = self.min_speed + (self.max_speed - self.min_speed) * shaped * pid_out;
        speed.clamp(self.min_speed, self.max_speed)
    }

    /// Nonlinear approach factor in `[0, 1]`: `1` when the target is
    /// infinitely far, `0` at `threshold_near`.
    pub fn shape(&self, ratio_proportion: f64) -> f64 {
        if self.threshold_near <= 0.0 {
            return 0.0;
        }
        let remaining = ((self.threshold_near - ratio_proportion) / self.threshold_near).clamp(0.0, 1.0);
        remaining.powf(self.exponent)
    }

    /// Drops PID memory. Called whenever pursuit is interrupted.
    pub fn reset(&mut self) { self.pid.reset(); }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.05;

    fn regulator() -> DistanceRegulator {
        DistanceRegulator::new(
            PidGains {
                kp: 1.2,
                ki: 0.1,
                kd: 0.05,
            },
            0.95,
            2.0,
            10,
            100,
        )
    }

    #[test]
    fn near_target_yields_zero() {
        let mut reg = regulator();
        assert_eq!(reg.regulate(0.95, DT), 0.0);
        assert_eq!(reg.regulate(1.4, DT), 0.0);
    }

    #[test]
    fn far_target_is_fast() {
        let mut reg = regulator();
        let speed = reg.regulate(0.0, DT);
        // shaped = 1, pid clamps to 1
        assert!((speed - 100.0).abs() < 1e-9);
    }

    #[test]
    fn speed_decays_toward_threshold() {
        let ratios = [0.1, 0.3, 0.5, 0.7, 0.9];
        let speeds: Vec<f64> = ratios
            .iter()
            .map(|r| {
                let mut reg = regulator();
                reg.regulate(*r, DT)
            })
            .collect();
        for pair in speeds.windows(2) {
            assert!(pair[0] > pair[1], "{:?}", speeds);
        }
        for s in &speeds {
            assert!((10.0..=100.0).contains(s));
        }
    }

    #[test]
    fn shaping_is_faster_than_linear() {
        let reg = regulator();
        let halfway = reg.shape(0.475);
        assert!(halfway < 0.5);
        assert!((halfway - 0.25).abs() < 1e-9);
    }

    #[test]
    fn non_finite_ratio_counts_as_far() {
        let mut reg = regulator();
        assert!((reg.regulate(f64::NAN, DT) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_threshold_never_drives() {
        let mut reg = DistanceRegulator::new(PidGains::default(), 0.0, 2.0, 10, 100);
        assert_eq!(reg.regulate(0.2, DT), 0.0);
    }
}
