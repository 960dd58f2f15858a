//! Discrete motion commands emitted to the actuator.
//!
//! A [`MotionCommand`] is the only thing that leaves the controller. How it
//! gets encoded onto the wire (register maps, framing, CRC) is the
//! dispatcher's business; the integer [`Direction::code`] is provided because
//! every motor driver on the platform speaks it.
//!
//! The driver table also has strafe and diagonal moves for mecanum chassis.
//! They decode so that logs and replays of driver traffic can be read back,
//! but the controller itself never emits them.

use std::fmt;

use crate::error::CommandCodeError;

/// Which way the platform should move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Hold still. The only direction that carries speed `0`.
    Stop,
    /// Drive straight ahead.
    Forward,
    /// Drive straight back.
    Backward,
    /// Slide left without turning.
    StrafeLeft,
    /// Slide right without turning.
    StrafeRight,
    /// Steer left while keeping wheel speeds positive on one side.
    TurnLeft,
    /// Steer right while keeping wheel speeds positive on one side.
    TurnRight,
    /// Spin counter-clockwise in place.
    RotateLeft,
    /// Spin clockwise in place.
    RotateRight,
    /// Diagonal, forward and to the left.
    ForwardLeft,
    /// Diagonal, forward and to the right.
    ForwardRight,
    /// Diagonal, backward and to the left.
    BackwardLeft,
    /// Diagonal, backward and to the right.
    BackwardRight,
}

impl Direction {
    /// Integer action code understood by the motor drivers.
    pub fn code(self) -> u8 {
        match self {
            Direction::Stop => 0,
            Direction::Forward => 1,
            Direction::Backward => 2,
            Direction::StrafeLeft => 3,
            Direction::StrafeRight => 4,
            Direction::TurnLeft => 5,
            Direction::TurnRight => 6,
            Direction::ForwardLeft => 7,
            Direction::ForwardRight => 8,
            Direction::BackwardLeft => 9,
            Direction::BackwardRight => 10,
            Direction::RotateLeft => 11,
            Direction::RotateRight => 12,
        }
    }

    /// Returns `true` for straight forward and backward travel, the only
    /// moves that go through the rate limiter.
    pub fn is_translation(self) -> bool { matches!(self, Direction::Forward | Direction::Backward) }
}

impl TryFrom<u8> for Direction {
    type Error = CommandCodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Direction::Stop),
            1 => Ok(Direction::Forward),
            2 => Ok(Direction::Backward),
            3 => Ok(Direction::StrafeLeft),
            4 => Ok(Direction::StrafeRight),
            5 => Ok(Direction::TurnLeft),
            6 => Ok(Direction::TurnRight),
            7 => Ok(Direction::ForwardLeft),
            8 => Ok(Direction::ForwardRight),
            9 => Ok(Direction::BackwardLeft),
            10 => Ok(Direction::BackwardRight),
            11 => Ok(Direction::RotateLeft),
            12 => Ok(Direction::RotateRight),
            other => Err(CommandCodeError::Unknown(other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Stop => "STOP",
            Direction::Forward => "FORWARD",
            Direction::Backward => "BACKWARD",
            Direction::StrafeLeft => "STRAFE_LEFT",
            Direction::StrafeRight => "STRAFE_RIGHT",
            Direction::TurnLeft => "TURN_LEFT",
            Direction::TurnRight => "TURN_RIGHT",
            Direction::ForwardLeft => "FORWARD_LEFT",
            Direction::ForwardRight => "FORWARD_RIGHT",
            Direction::BackwardLeft => "BACKWARD_LEFT",
            Direction::BackwardRight => "BACKWARD_RIGHT",
            Direction::RotateLeft => "ROTATE_LEFT",
            Direction::RotateRight => "ROTATE_RIGHT",
        };
        f.write_str(name)
    }
}

/// A single motion command.
///
/// `speed == 0` exactly when `direction == Direction::Stop`. The fields are
/// private so that invariant cannot be broken from outside; build commands
/// with [`MotionCommand::STOP`] or [`MotionCommand::moving`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MotionCommand {
    direction: Direction,
    speed:     u16,
}

impl MotionCommand {
    /// The all-stop command.
    pub const STOP: MotionCommand = MotionCommand {
        direction: Direction::Stop,
        speed:     0,
    };

    /// Builds a moving command, clamping `speed` into `[min_speed, max_speed]`.
    ///
    /// `Direction::Stop` always yields [`MotionCommand::STOP`] regardless of
    /// `speed`. A non-finite or sub-unit speed collapses to a stop as well,
    /// since the drivers cannot express "moving at zero".
    pub fn moving(direction: Direction, speed: f64, min_speed: u16, max_speed: u16) -> Self {
        if direction == Direction::Stop || !speed.is_finite() || speed < 0.5 {
            return Self::STOP;
        }
        let floor = min_speed.max(1);
        let ceil = max_speed.max(floor);
        let speed = speed.round().clamp(floor as f64, ceil as f64) as u16;
        Self { direction, speed }
    }

    pub fn direction(&self) -> Direction { self.direction }

    pub fn speed(&self) -> u16 { self.speed }

    pub fn is_stop(&self) -> bool { self.direction == Direction::Stop }
}

impl Default for MotionCommand {
    fn default() -> Self { Self::STOP }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.direction, self.speed)
    }
}
