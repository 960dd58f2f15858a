//! Turning filtered offsets and a regulated speed into one command.
//!
//! # Decision order
//!
//! The first rule that matches wins. Steering comes before translation
//! because the platform has to face the target before driving at it.
//!
//! 1. Horizontal offset outside the dead-band: turn toward the target, with
//!    the turn speed scaled by how far off-center it is.
//! 2. Size ratio above `stop_threshold`: the target has arrived, stop.
//! 3. Vertical offset outside the forward dead-band: translate at the
//!    regulated speed. Positive `oy` (target below center) backs up unless
//!    `invert_vertical` is set.
//! 4. Otherwise stop.

use std::time::{Duration, Instant};

use super::command::{Direction, MotionCommand};
use crate::config::ChaseConfig;

/// Stateless decision rules for pursuit.
#[derive(Clone, Debug)]
pub struct CommandArbitrator {
    offset_deadband:  f64,
    offset_span:      f64,
    forward_deadband: f64,
    stop_threshold:   f64,
    turn_speed:       u16,
    min_speed:        u16,
    max_speed:        u16,
    invert_steering:  bool,
    invert_vertical:  bool,
}

impl CommandArbitrator {
    pub fn from_config(config: &ChaseConfig) -> Self {
        Self {
            offset_deadband:  config.offset_deadband,
            offset_span:      config.effective_offset_span(),
            forward_deadband: config.forward_deadband,
            stop_threshold:   config.stop_threshold,
            turn_speed:       config.turn_speed,
            min_speed:        config.min_speed,
            max_speed:        config.max_speed,
            invert_steering:  config.invert_steering,
            invert_vertical:  config.invert_vertical,
        }
    }

    /// Picks the command for one pursuit tick.
    ///
    /// `ox`/`oy` are filtered pixel offsets from the frame center, `speed` is
    /// the regulated and rate-limited translation speed.
    pub fn decide(&self, ox: f64, oy: f64, speed: f64, ratio_proportion: f64) -> MotionCommand {
        if ox.abs() > self.offset_deadband {
            let right = (ox > 0.0) != self.invert_steering;
            let direction = if right { Direction::TurnRight } else { Direction::TurnLeft };
            return MotionCommand::moving(direction, self.turn_speed_for(ox), self.min_speed, self.max_speed);
        }

        if ratio_proportion > self.stop_threshold {
            return MotionCommand::STOP;
        }

        if oy.abs() > self.forward_deadband {
            let back = (oy > 0.0) != self.invert_vertical;
            let direction = if back { Direction::Backward } else { Direction::Forward };
            return MotionCommand::moving(direction, speed, self.min_speed, self.max_speed);
        }

        MotionCommand::STOP
    }

    /// Proportional steering: full `turn_speed` once the offset reaches
    /// `offset_span`.
    fn turn_speed_for(&self, ox: f64) -> f64 {
        let scale = if self.offset_span > 0.0 { (ox.abs() / self.offset_span).min(1.0) } else { 1.0 };
        self.turn_speed as f64 * scale
    }
}

/// Command-change suppression.
///
/// A command is let through when it differs from the last dispatched one or
/// when `interval` has elapsed since the last dispatch. `STOP` is never held
/// back.
#[derive(Clone, Debug)]
pub struct DispatchGate {
    interval:     Duration,
    last_command: Option<MotionCommand>,
    last_time:    Option<Instant>,
}

impl DispatchGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_command: None,
            last_time: None,
        }
    }

    /// Returns whether `command` should go out now, recording it if so.
    pub fn admit(&mut self, command: MotionCommand, now: Instant) -> bool {
        let due = match (self.last_command, self.last_time) {
            _ if command.is_stop() => true,
            (Some(last), Some(at)) if last == command => now.saturating_duration_since(at) >= self.interval,
            _ => true,
        };
        if due {
            self.last_command = Some(command);
            self.last_time = Some(now);
        }
        due
    }

    pub fn last_command(&self) -> Option<MotionCommand> { self.last_command }

    pub fn last_time(&self) -> Option<Instant> { self.last_time }
}
