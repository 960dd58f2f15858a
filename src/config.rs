//! Calibration and tuning for the chase controller.
//!
//! Every field has a default, so a YAML file only needs to name what differs
//! from the stock tuning:
//!
//! ```yaml
//! reference_ratio: 0.028
//! max_lost_frames: 20
//! search_timeout: 8s
//! pid:
//!   kp: 1.0
//!   ki: 0.05
//!   kd: 0.1
//! ```
//!
//! Durations use humantime notation (`"200ms"`, `"10s"`).

use std::{fs, path::Path, time::Duration};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    motion::pid::PidGains,
    tracking::{sample::FrameGeometry, state::SearchPolicy},
};

/// All calibration inputs of the controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseConfig {
    /// Frame width in pixels.
    pub frame_width:            u32,
    /// Frame height in pixels.
    pub frame_height:           u32,
    /// Size ratio observed at the desired standoff distance.
    pub reference_ratio:        f64,
    /// Offset smoothing factor in `(0, 1]`. Higher follows the raw signal
    /// more closely.
    pub alpha:                  f64,
    /// Horizontal offset (px) treated as centered.
    pub offset_deadband:        f64,
    /// Horizontal offset (px) at which turning reaches `turn_speed`.
    /// Defaults to half the frame width.
    pub offset_span:            Option<f64>,
    /// Vertical offset (px) treated as centered.
    pub forward_deadband:       f64,
    /// Consecutive missed ticks before searching.
    pub max_lost_frames:        u32,
    /// Time after which the search sweep reverses.
    #[serde(with = "humantime_duration")]
    pub search_timeout:         Duration,
    /// Turn speed used while searching.
    pub search_speed:           u16,
    /// Ticks spent turning per search duty cycle.
    pub search_turn_ticks:      u32,
    /// Ticks spent stopped per search duty cycle.
    pub search_pause_ticks:     u32,
    /// Rotate in place while searching instead of turning.
    pub search_rotate_in_place: bool,
    pub min_speed:              u16,
    pub max_speed:              u16,
    /// Turn speed at full horizontal offset.
    pub turn_speed:             u16,
    /// Translation speed change cap, speed units per second.
    pub max_acceleration:       f64,
    pub pid:                    PidGains,
    /// Ratio proportion at which the regulator stops advancing.
    pub threshold_near:         f64,
    /// Power applied to the remaining distance when shaping speed (`>= 1`).
    pub approach_exponent:      f64,
    /// Ratio proportion above which the arbitrator stops.
    pub stop_threshold:         f64,
    /// Minimum interval before an unchanged command is sent again.
    #[serde(with = "humantime_duration")]
    pub dispatch_interval:      Duration,
    /// Nominal control period.
    #[serde(with = "humantime_duration")]
    pub tick_period:            Duration,
    /// Swap left/right turning (camera mounted mirrored).
    pub invert_steering:        bool,
    /// Swap forward/backward for vertical offsets (camera mounted flipped).
    pub invert_vertical:        bool,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            frame_width:            640,
            frame_height:           480,
            reference_ratio:        0.0322265625,
            alpha:                  0.2,
            offset_deadband:        50.0,
            offset_span:            None,
            forward_deadband:       50.0,
            max_lost_frames:        15,
            search_timeout:         Duration::from_secs(10),
            search_speed:           20,
            search_turn_ticks:      1,
            search_pause_ticks:     0,
            search_rotate_in_place: false,
            min_speed:              10,
            max_speed:              100,
            turn_speed:             25,
            max_acceleration:       200.0,
            pid:                    PidGains::default(),
            threshold_near:         0.95,
            approach_exponent:      2.0,
            stop_threshold:         0.95,
            dispatch_interval:      Duration::from_millis(200),
            tick_period:            Duration::from_millis(50),
            invert_steering:        false,
            invert_vertical:        false,
        }
    }
}

impl ChaseConfig {
    /// Reads, parses and validates a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parses and validates YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ChaseConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the controller cannot run with.
    ///
    /// A zero `reference_ratio` or frame size is allowed: the controller then
    /// treats every target as far away, and with no frame size also as
    /// centered, so it never steers. It is logged because it is almost
    /// certainly a missing calibration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::invalid("alpha", format!("{} is outside (0, 1]", self.alpha)));
        }
        if self.min_speed > self.max_speed {
            return Err(ConfigError::invalid(
                "min_speed",
                format!("{} exceeds max_speed {}", self.min_speed, self.max_speed),
            ));
        }
        if self.max_speed == 0 {
            return Err(ConfigError::invalid("max_speed", "must be positive"));
        }
        if !(self.max_acceleration.is_finite() && self.max_acceleration > 0.0) {
            return Err(ConfigError::invalid(
                "max_acceleration",
                format!("{} is not a positive rate", self.max_acceleration),
            ));
        }
        non_negative("offset_deadband", self.offset_deadband)?;
        non_negative("forward_deadband", self.forward_deadband)?;
        if let Some(span) = self.offset_span {
            positive("offset_span", span)?;
        }
        positive("threshold_near", self.threshold_near)?;
        positive("stop_threshold", self.stop_threshold)?;
        if !(self.approach_exponent.is_finite() && self.approach_exponent >= 1.0) {
            return Err(ConfigError::invalid(
                "approach_exponent",
                format!("{} is below 1", self.approach_exponent),
            ));
        }
        for (field, gain) in [("pid.kp", self.pid.kp), ("pid.ki", self.pid.ki), ("pid.kd", self.pid.kd)] {
            non_negative(field, gain)?;
        }
        if self.max_lost_frames == 0 {
            return Err(ConfigError::invalid("max_lost_frames", "must be at least 1"));
        }
        if self.search_turn_ticks == 0 {
            return Err(ConfigError::invalid("search_turn_ticks", "must be at least 1"));
        }
        if self.tick_period.is_zero() {
            return Err(ConfigError::invalid("tick_period", "must be non-zero"));
        }

        if !(self.reference_ratio.is_finite() && self.reference_ratio > 0.0) {
            warn!(
                "reference_ratio is {}; every target will be treated as far away",
                self.reference_ratio
            );
        }
        if !self.frame().is_known() {
            warn!(
                "Frame size {}x{} is unset; every target will be treated as centered and far away",
                self.frame_width, self.frame_height
            );
        }
        Ok(())
    }

    pub fn frame(&self) -> FrameGeometry { FrameGeometry::new(self.frame_width, self.frame_height) }

    /// `offset_span`, or half the frame width when unset.
    pub fn effective_offset_span(&self) -> f64 {
        self.offset_span.unwrap_or(self.frame_width as f64 / 2.0)
    }

    pub fn search_policy(&self) -> SearchPolicy {
        SearchPolicy {
            max_lost_frames: self.max_lost_frames,
            search_timeout:  self.search_timeout,
            turn_ticks:      self.search_turn_ticks,
            pause_ticks:     self.search_pause_ticks,
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} is negative or not finite", value)))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} is not positive", value)))
    }
}

/// Serde adapter for durations written as `"250ms"`, `"10s"` and so on.
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(d)?;
        humantime::parse_duration(&text).map_err(D::Error::custom)
    }
}
