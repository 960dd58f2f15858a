//! Turning target measurements into motion.
//!
//! This module holds everything between "where is the target" and "what do
//! the wheels do":
//!
//! - **Regulation**: a PID-shaped mapping from apparent size to approach
//!   speed.
//! - **Rate limiting**: an acceleration cap on commanded speed.
//! - **Arbitration**: dead-band rules that pick one discrete command, and a
//!   gate that suppresses redundant re-sends.
//!
//! # Example
//!
//! ```ignore
//! use chaser::motion::{limiter::RateLimiter, regulator::DistanceRegulator};
//!
//! let mut regulator = DistanceRegulator::new(gains, 0.95, 2.0, 10, 100);
//! let mut limiter = RateLimiter::new(200.0, tick);
//!
//! let desired = regulator.regulate(ratio, dt);
//! let speed = limiter.step(desired, now);
//! ```

/// Dead-band arbitration and dispatch suppression.
pub mod arbitrator;

/// The discrete [`MotionCommand`](command::MotionCommand) and its directions.
pub mod command;

/// Acceleration cap.
pub mod limiter;

/// PID controller with anti-windup.
pub mod pid;

/// Size-ratio to speed regulation.
///
/// Combines the PID output with a nonlinear approach curve so the platform
/// slows smoothly as it closes in.
pub mod regulator;
