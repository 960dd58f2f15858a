//! The chase controller: one call per control tick.
//!
//! [`ChaseController::tick`] takes the newest detection (or its absence) and
//! the platform readiness, and returns the command for this tick together
//! with whether it should be sent to the actuator.
//!
//! # Pipeline
//!
//! ```text
//! sample ─► validate ─► state machine ─┬─ SEARCHING ─► sweep turn
//!                                      └─ PURSUING ──► filter ─► regulator ─► limiter ─► arbitrator
//!                                                                                            │
//!                                                           dispatch gate ◄──────────────────┘
//! ```
//!
//! The controller owns all tracking state exclusively. It is `Send` but not
//! meant to be shared; wrap it in the [`runtime`](crate::runtime) loop or
//! call it from a single thread.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use chaser::{ChaseConfig, ChaseController, Readiness, TargetSample};
//!
//! let mut controller = ChaseController::new(ChaseConfig::default());
//! let out = controller.tick(Some(TargetSample::new(320.0, 240.0, 0.0322265625)), Readiness::Ready, Instant::now());
//! assert!(out.command.is_stop());
//! ```

use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::{
    config::ChaseConfig,
    motion::{
        arbitrator::{CommandArbitrator, DispatchGate},
        command::{Direction, MotionCommand},
        limiter::RateLimiter,
        regulator::DistanceRegulator,
    },
    tracking::{
        filter::OffsetFilter,
        sample::{FrameGeometry, TargetSample, ratio_proportion},
        state::{SearchDirection, TrackerMode, TrackingStateMachine, Transition},
    },
};

/// Platform readiness reported alongside each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Readiness {
    /// The controller may drive.
    #[default]
    Ready,
    /// Something else owns the platform (an arm move, manual control).
    /// The controller holds still and freezes its state.
    Moving,
    /// Emergency stop. Tracking state is discarded when `Ready` returns.
    EStop,
}

/// Result of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlOutput {
    /// The command chosen for this tick.
    pub command:  MotionCommand,
    /// Whether the command should go out now. `false` means it repeats the
    /// last dispatched command within the dispatch interval.
    pub dispatch: bool,
    /// Tracking mode after the tick.
    pub mode:     TrackerMode,
}

/// Read-only view of the controller's tracking state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerState {
    pub mode:                   TrackerMode,
    pub lost_count:             u32,
    pub last_valid_position:    Option<(f64, f64)>,
    pub search_direction:       SearchDirection,
    /// When the current search sweep started, `None` while pursuing.
    pub search_start:           Option<Instant>,
    pub filtered_offset_x:      f64,
    pub filtered_offset_y:      f64,
    pub current_speed:          f64,
    pub last_command:           Option<MotionCommand>,
    pub last_command_time:      Option<Instant>,
    pub last_speed_update_time: Option<Instant>,
}

/// Closed-loop chase controller.
#[derive(Clone, Debug)]
pub struct ChaseController {
    config:        ChaseConfig,
    frame:         FrameGeometry,
    tracker:       TrackingStateMachine,
    filter:        OffsetFilter,
    regulator:     DistanceRegulator,
    limiter:       RateLimiter,
    arbitrator:    CommandArbitrator,
    gate:          DispatchGate,
    last_tick:     Option<Instant>,
    estop_latched: bool,
}

impl ChaseController {
    /// Builds a controller from an already validated config.
    pub fn new(config: ChaseConfig) -> Self {
        let frame = config.frame();
        Self {
            frame,
            tracker: TrackingStateMachine::new(config.search_policy(), frame),
            filter: OffsetFilter::new(config.alpha),
            regulator: DistanceRegulator::new(
                config.pid,
                config.threshold_near,
                config.approach_exponent,
                config.min_speed,
                config.max_speed,
            ),
            limiter: RateLimiter::new(config.max_acceleration, config.tick_period),
            arbitrator: CommandArbitrator::from_config(&config),
            gate: DispatchGate::new(config.dispatch_interval),
            last_tick: None,
            estop_latched: false,
            config,
        }
    }

    /// Runs one control tick.
    ///
    /// `sample` is the newest detection, `None` when nothing was detected.
    /// Malformed samples are discarded and count as a miss.
    pub fn tick(&mut self, sample: Option<TargetSample>, readiness: Readiness, now: Instant) -> ControlOutput {
        match readiness {
            Readiness::EStop => return self.emergency_stop(now),
            Readiness::Moving => return self.hold(now),
            Readiness::Ready => {}
        }
        if self.estop_latched {
            info!("Emergency stop released, tracking state reset");
            self.reset();
        }

        let sample = sample.and_then(|s| {
            let valid = s.validated(self.frame);
            if valid.is_none() {
                debug!("Discarding malformed sample {:?}", s);
            }
            valid
        });

        let dt = self.advance_clock(now);
        let transition = self.tracker.observe(sample.as_ref(), now);
        match transition {
            Transition::SearchStarted(_) => self.regulator.reset(),
            // the offset held from before the loss is stale by now
            Transition::Reacquired => self.filter.reset(),
            Transition::Steady | Transition::SearchFlipped(_) => {}
        }

        let command = match (self.tracker.mode(), sample) {
            (TrackerMode::Searching, _) => {
                self.limiter.settle(0.0, now);
                self.search_command()
            }
            (TrackerMode::Pursuing, Some(s)) => self.pursue(&s, dt, now),
            (TrackerMode::Pursuing, None) => {
                // freshly lost: stop and wait for the lost threshold
                self.regulator.reset();
                self.limiter.settle(0.0, now);
                MotionCommand::STOP
            }
        };

        self.emit(command, now)
    }

    /// Immediate stop, bypassing tracking entirely.
    ///
    /// Latches until the next `Ready` tick, which resets the tracking state.
    pub fn emergency_stop(&mut self, now: Instant) -> ControlOutput {
        if !self.estop_latched {
            warn!("Emergency stop engaged");
            self.estop_latched = true;
        }
        self.limiter.settle(0.0, now);
        self.regulator.reset();
        self.emit(MotionCommand::STOP, now)
    }

    /// Stop without touching the state machine.
    fn hold(&mut self, now: Instant) -> ControlOutput {
        self.regulator.reset();
        self.limiter.reset();
        self.last_tick = None;
        self.emit(MotionCommand::STOP, now)
    }

    fn pursue(&mut self, sample: &TargetSample, dt: f64, now: Instant) -> MotionCommand {
        let (raw_x, raw_y) = sample.offsets(self.frame);
        let (ox, oy) = self.filter.update(raw_x, raw_y);
        let ratio = ratio_proportion(sample.size_ratio, self.config.reference_ratio, self.frame);

        let desired = self.regulator.regulate(ratio, dt);
        let speed = self.limiter.step(desired, now);
        let command = self.arbitrator.decide(ox, oy, speed, ratio);

        let translated = if command.direction().is_translation() { command.speed() as f64 } else { 0.0 };
        self.limiter.settle(translated, now);

        trace!(
            "offset ({:.1}, {:.1}) ratio {:.3} desired {:.1} limited {:.1} -> {}",
            ox,
            oy,
            ratio,
            desired,
            speed,
            command
        );
        command
    }

    fn search_command(&mut self) -> MotionCommand {
        if !self.tracker.search_duty_on() {
            return MotionCommand::STOP;
        }
        let direction = match (self.tracker.search_direction(), self.config.search_rotate_in_place) {
            (SearchDirection::Left, false) => Direction::TurnLeft,
            (SearchDirection::Right, false) => Direction::TurnRight,
            (SearchDirection::Left, true) => Direction::RotateLeft,
            (SearchDirection::Right, true) => Direction::RotateRight,
        };
        MotionCommand::moving(
            direction,
            self.config.search_speed as f64,
            self.config.min_speed,
            self.config.max_speed,
        )
    }

    /// Seconds since the previous driving tick, or one tick period when there
    /// is none or the clock stood still.
    fn advance_clock(&mut self, now: Instant) -> f64 {
        let dt = match self.last_tick {
            Some(last) if now > last => now - last,
            _ => self.config.tick_period,
        };
        self.last_tick = Some(now);
        dt.max(Duration::from_micros(1)).as_secs_f64()
    }

    fn emit(&mut self, command: MotionCommand, now: Instant) -> ControlOutput {
        let dispatch = self.gate.admit(command, now);
        if dispatch {
            trace!("dispatch {}", command);
        }
        ControlOutput {
            command,
            dispatch,
            mode: self.tracker.mode(),
        }
    }

    /// Back to the "no target" baseline: pursuing, nothing seen, at rest.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.filter.reset();
        self.regulator.reset();
        self.limiter.reset();
        self.last_tick = None;
        self.estop_latched = false;
    }

    pub fn state(&self) -> TrackerState {
        let (filtered_offset_x, filtered_offset_y) = self.filter.value();
        TrackerState {
            mode: self.tracker.mode(),
            lost_count: self.tracker.lost_count(),
            last_valid_position: self.tracker.last_valid_position(),
            search_direction: self.tracker.search_direction(),
            search_start: self.tracker.search_start(),
            filtered_offset_x,
            filtered_offset_y,
            current_speed: self.limiter.current(),
            last_command: self.gate.last_command(),
            last_command_time: self.gate.last_time(),
            last_speed_update_time: self.limiter.last_update(),
        }
    }

    pub fn config(&self) -> &ChaseConfig { &self.config }

    pub fn is_estopped(&self) -> bool { self.estop_latched }
}
