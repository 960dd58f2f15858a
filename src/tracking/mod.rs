//! Keeping track of the target between frames.
//!
//! # Module Structure
//!
//! - **[`sample`]**: Detections and frame geometry.
//! - **[`filter`]**: Exponential smoothing of the target's offset.
//! - **[`state`]**: The pursuing/searching state machine.
//!
//! Detections arrive at most once per tick and may be missing or garbage.
//! Garbage is discarded at the [`sample`] boundary, so the filter and state
//! machine only ever see finite, in-frame measurements.

/// Exponential offset smoothing.
pub mod filter;

/// Target detections and frame geometry.
pub mod sample;

/// Pursuit and search state machine.
pub mod state;
