//! Found/lost bookkeeping and the search sweep.
//!
//! # States
//!
//! - **Pursuing** (initial): a target was seen within the last
//!   `max_lost_frames` ticks.
//! - **Searching**: the target has been missing for `max_lost_frames`
//!   consecutive ticks. The platform turns toward the side the target was last
//!   seen on and reverses the sweep every `search_timeout`.
//!
//! Any valid sample returns the machine to Pursuing.

use std::{
    fmt,
    time::{Duration, Instant},
};

use log::{debug, info};

use super::sample::{FrameGeometry, TargetSample};

/// Coarse tracking mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerMode {
    Pursuing,
    Searching,
}

impl fmt::Display for TrackerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerMode::Pursuing => f.write_str("PURSUING"),
            TrackerMode::Searching => f.write_str("SEARCHING"),
        }
    }
}

/// Side the search sweep turns toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchDirection {
    Left,
    Right,
}

impl SearchDirection {
    /// `-1` for left, `+1` for right.
    pub fn sign(self) -> i8 {
        match self {
            SearchDirection::Left => -1,
            SearchDirection::Right => 1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SearchDirection::Left => SearchDirection::Right,
            SearchDirection::Right => SearchDirection::Left,
        }
    }
}

/// What changed on a tick, for the caller's benefit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Nothing beyond counters.
    Steady,
    /// A sample arrived while searching.
    Reacquired,
    /// The lost threshold was just crossed.
    SearchStarted(SearchDirection),
    /// The sweep timed out and reversed.
    SearchFlipped(SearchDirection),
}

/// Tunables for [`TrackingStateMachine`].
#[derive(Clone, Copy, Debug)]
pub struct SearchPolicy {
    pub max_lost_frames: u32,
    pub search_timeout:  Duration,
    /// Ticks per sweep cycle spent turning.
    pub turn_ticks:      u32,
    /// Ticks per sweep cycle spent stopped. `0` turns continuously.
    pub pause_ticks:     u32,
}

/// The tracking state machine.
#[derive(Clone, Debug)]
pub struct TrackingStateMachine {
    policy:              SearchPolicy,
    frame:               FrameGeometry,
    mode:                TrackerMode,
    lost_count:          u32,
    last_valid_position: Option<(f64, f64)>,
    search_direction:    SearchDirection,
    search_start:        Option<Instant>,
    search_tick:         u32,
}

impl TrackingStateMachine {
    pub fn new(policy: SearchPolicy, frame: FrameGeometry) -> Self {
        Self {
            policy: SearchPolicy {
                max_lost_frames: policy.max_lost_frames.max(1),
                turn_ticks: policy.turn_ticks.max(1),
                ..policy
            },
            frame,
            mode: TrackerMode::Pursuing,
            lost_count: 0,
            last_valid_position: None,
            search_direction: SearchDirection::Left,
            search_start: None,
            search_tick: 0,
        }
    }

    /// Advances the machine by one tick.
    ///
    /// `sample` must already be validated; `None` is a missed detection.
    pub fn observe(&mut self, sample: Option<&TargetSample>, now: Instant) -> Transition {
        match sample {
            Some(s) => self.on_sample(s),
            None => self.on_miss(now),
        }
    }

    fn on_sample(&mut self, sample: &TargetSample) -> Transition {
        self.lost_count = 0;
        self.last_valid_position = Some((sample.x, sample.y));
        if self.mode == TrackerMode::Searching {
            info!("Target reacquired at ({:.0}, {:.0})", sample.x, sample.y);
            self.mode = TrackerMode::Pursuing;
            self.search_start = None;
            return Transition::Reacquired;
        }
        Transition::Steady
    }

    fn on_miss(&mut self, now: Instant) -> Transition {
        self.lost_count = self.lost_count.saturating_add(1);

        match self.mode {
            TrackerMode::Pursuing if self.lost_count >= self.policy.max_lost_frames => {
                self.search_direction = self.side_last_seen();
                self.search_start = Some(now);
                self.search_tick = 0;
                self.mode = TrackerMode::Searching;
                info!(
                    "Target lost for {} ticks, searching {:?}",
                    self.lost_count, self.search_direction
                );
                Transition::SearchStarted(self.search_direction)
            }
            TrackerMode::Searching => {
                let started = *self.search_start.get_or_insert(now);
                if now.saturating_duration_since(started) > self.policy.search_timeout {
                    self.search_direction = self.search_direction.flipped();
                    self.search_start = Some(now);
                    debug!("Search sweep reversed, now {:?}", self.search_direction);
                    return Transition::SearchFlipped(self.search_direction);
                }
                Transition::Steady
            }
            TrackerMode::Pursuing => Transition::Steady,
        }
    }

    /// Search right if the target was last seen right of center, else left.
    /// Without a known frame size there is no center, so left.
    fn side_last_seen(&self) -> SearchDirection {
        if !self.frame.is_known() {
            return SearchDirection::Left;
        }
        let (cx, _) = self.frame.center();
        match self.last_valid_position {
            Some((x, _)) if x > cx => SearchDirection::Right,
            _ => SearchDirection::Left,
        }
    }

    /// Whether this search tick falls in the turning part of the duty cycle.
    /// Advances the duty counter.
    pub fn search_duty_on(&mut self) -> bool {
        let period = self.policy.turn_ticks + self.policy.pause_ticks;
        let on = self.search_tick % period < self.policy.turn_ticks;
        self.search_tick = (self.search_tick + 1) % period;
        on
    }

    /// Returns to the optimistic initial state with no target memory.
    pub fn reset(&mut self) {
        self.mode = TrackerMode::Pursuing;
        self.lost_count = 0;
        self.last_valid_position = None;
        self.search_direction = SearchDirection::Left;
        self.search_start = None;
        self.search_tick = 0;
    }

    pub fn mode(&self) -> TrackerMode { self.mode }

    pub fn lost_count(&self) -> u32 { self.lost_count }

    pub fn last_valid_position(&self) -> Option<(f64, f64)> { self.last_valid_position }

    pub fn search_direction(&self) -> SearchDirection { self.search_direction }

    pub fn search_start(&self) -> Option<Instant> { self.search_start }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(50);

    fn machine(max_lost: u32) -> TrackingStateMachine {
        TrackingStateMachine::new(
            SearchPolicy {
                max_lost_frames: max_lost,
                search_timeout:  Duration::from_secs(10),
                turn_ticks:      1,
                pause_ticks:     0,
            },
            FrameGeometry::new(640, 480),
        )
    }

    #[test]
    fn starts_pursuing() {
        let sm = machine(15);
        assert_eq!(sm.mode(), TrackerMode::Pursuing);
        assert_eq!(sm.lost_count(), 0);
    }

    #[test]
    fn enters_search_at_threshold() {
        let t0 = Instant::now();
        let mut sm = machine(3);
        sm.observe(Some(&TargetSample::new(100.0, 240.0, 0.01)), t0);
        assert_eq!(sm.observe(None, t0 + TICK), Transition::Steady);
        assert_eq!(sm.observe(None, t0 + TICK * 2), Transition::Steady);
        assert_eq!(
            sm.observe(None, t0 + TICK * 3),
            Transition::SearchStarted(SearchDirection::Left)
        );
        assert_eq!(sm.mode(), TrackerMode::Searching);
        assert_eq!(sm.search_direction().sign(), -1);
    }

    #[test]
    fn searches_toward_last_side() {
        let t0 = Instant::now();
        let mut sm = machine(2);
        sm.observe(Some(&TargetSample::new(500.0, 240.0, 0.01)), t0);
        sm.observe(None, t0 + TICK);
        sm.observe(None, t0 + TICK * 2);
        assert_eq!(sm.search_direction(), SearchDirection::Right);
    }

    #[test]
    fn unknown_frame_searches_left() {
        let t0 = Instant::now();
        let mut sm = TrackingStateMachine::new(
            SearchPolicy {
                max_lost_frames: 1,
                search_timeout:  Duration::from_secs(10),
                turn_ticks:      1,
                pause_ticks:     0,
            },
            FrameGeometry::new(0, 0),
        );
        sm.observe(Some(&TargetSample::new(600.0, 240.0, 0.01)), t0);
        sm.observe(None, t0 + TICK);
        assert_eq!(sm.search_direction(), SearchDirection::Left);
    }

    #[test]
    fn never_seen_searches_left() {
        let t0 = Instant::now();
        let mut sm = machine(1);
        sm.observe(None, t0);
        assert_eq!(sm.mode(), TrackerMode::Searching);
        assert_eq!(sm.search_direction(), SearchDirection::Left);
    }

    #[test]
    fn sweep_reverses_after_timeout() {
        let t0 = Instant::now();
        let mut sm = machine(1);
        sm.observe(None, t0);
        assert_eq!(sm.observe(None, t0 + Duration::from_secs(5)), Transition::Steady);
        assert_eq!(
            sm.observe(None, t0 + Duration::from_millis(10_050)),
            Transition::SearchFlipped(SearchDirection::Right)
        );
        // timer restarted from the flip
        assert_eq!(sm.observe(None, t0 + Duration::from_secs(15)), Transition::Steady);
        assert_eq!(
            sm.observe(None, t0 + Duration::from_secs(21)),
            Transition::SearchFlipped(SearchDirection::Left)
        );
    }

    #[test]
    fn sample_ends_search() {
        let t0 = Instant::now();
        let mut sm = machine(1);
        sm.observe(None, t0);
        let t = sm.observe(Some(&TargetSample::new(300.0, 200.0, 0.02)), t0 + TICK);
        assert_eq!(t, Transition::Reacquired);
        assert_eq!(sm.mode(), TrackerMode::Pursuing);
        assert_eq!(sm.lost_count(), 0);
        assert_eq!(sm.search_start(), None);
    }

    #[test]
    fn duty_cycle_alternates() {
        let mut sm = TrackingStateMachine::new(
            SearchPolicy {
                max_lost_frames: 1,
                search_timeout:  Duration::from_secs(10),
                turn_ticks:      2,
                pause_ticks:     1,
            },
            FrameGeometry::new(640, 480),
        );
        let pattern: Vec<bool> = (0..6).map(|_| sm.search_duty_on()).collect();
        assert_eq!(pattern, vec![true, true, false, true, true, false]);
    }

    #[test]
    fn reset_forgets_everything() {
        let t0 = Instant::now();
        let mut sm = machine(1);
        sm.observe(Some(&TargetSample::new(600.0, 200.0, 0.02)), t0);
        sm.observe(None, t0 + TICK);
        sm.reset();
        assert_eq!(sm.mode(), TrackerMode::Pursuing);
        assert_eq!(sm.lost_count(), 0);
        assert_eq!(sm.last_valid_position(), None);
    }
}
