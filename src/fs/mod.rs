//! Filesystem utilities.
//!
//! # Logging
//!
//! The `logger` submodule provides a logger that writes to the console and,
//! optionally, a file. Controller decisions are logged at `trace`, mode
//! changes at `info`, so a file log at `Debug` is usually enough to
//! reconstruct a chase after the fact.
//!
//! # Example
//!
//! ```ignore
//! use chaser::fs::logger;
//! use log::{info, LevelFilter};
//!
//! logger::init(LevelFilter::Debug, Some("chase.log")).expect("Failed to initialize logger");
//! info!("Controller initialized");
//! ```

/// Console and file logging.
pub mod logger;
