//! # Chaser
//!
//! Chaser is the closed-loop core of a mobile platform that follows a colored
//! object. It consumes one 2-D detection per tick (image-plane centroid and
//! apparent size) and emits one discrete motion command, keeping the motion
//! smooth and bounded while the detections stay noisy and intermittent.
//!
//! - **Tracking**: exponential smoothing of the target's offset and a
//!   pursuing/searching state machine that sweeps toward where the target was
//!   last seen.
//! - **Motion Control**: PID distance regulation with a nonlinear approach
//!   curve, an acceleration cap, and dead-band command arbitration with
//!   change suppression.
//! - **Runtime**: an async control loop with latest-wins channels and an
//!   emergency stop that bypasses everything.
//! - **Logging**: a console and file logger for the `log` facade.
//!
//! ## Quick Start
//!
//! ```
//! use std::time::Instant;
//! use chaser::{ChaseConfig, ChaseController, Direction, Readiness, TargetSample};
//!
//! let config = ChaseConfig::default();
//! let mut controller = ChaseController::new(config);
//!
//! // target right of center, half as big as at the standoff distance
//! let sample = TargetSample::new(500.0, 240.0, 0.5 * 0.0322265625);
//! let out = controller.tick(Some(sample), Readiness::Ready, Instant::now());
//! assert_eq!(out.command.direction(), Direction::TurnRight);
//! ```
//!
//! ## Modules
//!
//! - [`tracking`]: Samples, offset filtering and the tracking state machine.
//! - [`motion`]: Commands, PID, regulation, rate limiting and arbitration.
//! - [`controller`]: The per-tick pipeline.
//! - [`runtime`]: The tokio control loop.
//! - [`config`]: Calibration and tuning.
//! - [`fs`]: Filesystem utilities including logging.

/// Calibration and tuning.
///
/// Provides [`ChaseConfig`](config::ChaseConfig), loadable from YAML with
/// every field defaulted.
pub mod config;

/// The per-tick control pipeline.
pub mod controller;

/// Error types.
pub mod error;

/// Filesystem utilities module.
///
/// Contains the console and file logger.
pub mod fs;

/// Motion control module.
///
/// - **Commands**: the discrete [`MotionCommand`](motion::command::MotionCommand).
/// - **PID Control**: a reusable PID with anti-windup.
/// - **Regulation, Limiting, Arbitration**: the stages between a filtered
///   measurement and a command.
pub mod motion;

/// Async control loop.
///
/// Runs a [`ChaseController`](controller::ChaseController) as a tokio task
/// fed by latest-wins channels.
pub mod runtime;

/// Target tracking module.
///
/// Validation of detections, offset smoothing and the pursuing/searching
/// state machine.
pub mod tracking;

pub use config::ChaseConfig;
pub use controller::{ChaseController, ControlOutput, Readiness, TrackerState};
pub use error::{CommandCodeError, ConfigError, DispatchError};
pub use motion::command::{Direction, MotionCommand};
pub use tracking::{
    sample::{FrameGeometry, TargetSample},
    state::{SearchDirection, TrackerMode},
};
