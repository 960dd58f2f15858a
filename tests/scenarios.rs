//! End-to-end behaviour of the chase controller, driven tick by tick with a
//! synthetic clock.

use std::time::{Duration, Instant};

use chaser::{
    ChaseConfig, ChaseController, Direction, MotionCommand, Readiness, SearchDirection, TargetSample, TrackerMode,
};
use proptest::prelude::*;

const TICK: Duration = Duration::from_millis(50);
const REF: f64 = 0.0322265625;

fn controller() -> ChaseController { ChaseController::new(ChaseConfig::default()) }

#[test]
fn centered_at_distance_stops() {
    let mut c = controller();
    let out = c.tick(Some(TargetSample::new(320.0, 240.0, REF)), Readiness::Ready, Instant::now());
    assert_eq!(out.command, MotionCommand::STOP);
    assert_eq!(out.command.speed(), 0);
}

#[test]
fn right_of_center_turns_right() {
    let mut c = controller();
    let out = c.tick(
        Some(TargetSample::new(500.0, 240.0, 0.5 * REF)),
        Readiness::Ready,
        Instant::now(),
    );
    assert_eq!(out.command.direction(), Direction::TurnRight);
    assert!(out.command.speed() > 0);
    assert!(out.dispatch);
}

#[test]
fn lost_left_searches_left_until_reacquired() {
    let t0 = Instant::now();
    let mut c = ChaseController::new(ChaseConfig {
        max_lost_frames: 15,
        ..ChaseConfig::default()
    });
    c.tick(Some(TargetSample::new(100.0, 240.0, 0.5 * REF)), Readiness::Ready, t0);

    let mut commands = Vec::new();
    for i in 1..=20 {
        commands.push(c.tick(None, Readiness::Ready, t0 + TICK * i).command);
    }

    let state = c.state();
    assert_eq!(state.mode, TrackerMode::Searching);
    assert_eq!(state.search_direction, SearchDirection::Left);
    assert_eq!(state.search_direction.sign(), -1);
    assert_eq!(state.lost_count, 20);
    assert!(state.search_start.is_some());

    // ticks 1..14 are a brief loss, from the 15th on the sweep runs
    assert!(commands[..14].iter().all(|c| c.is_stop()));
    assert!(commands[14..].iter().all(|c| c.direction() == Direction::TurnLeft));

    let out = c.tick(
        Some(TargetSample::new(320.0, 240.0, REF)),
        Readiness::Ready,
        t0 + TICK * 21,
    );
    assert_eq!(out.mode, TrackerMode::Pursuing);
    assert!(out.command.is_stop());
    assert_eq!(c.state().lost_count, 0);
    assert_eq!(c.state().search_start, None);
}

#[test]
fn never_seen_target_searches_left() {
    let t0 = Instant::now();
    let mut c = ChaseController::new(ChaseConfig {
        max_lost_frames: 3,
        ..ChaseConfig::default()
    });
    for i in 0..3 {
        c.tick(None, Readiness::Ready, t0 + TICK * i);
    }
    assert_eq!(c.state().mode, TrackerMode::Searching);
    assert_eq!(c.state().search_direction, SearchDirection::Left);
}

#[test]
fn search_sweep_reverses_after_timeout() {
    let t0 = Instant::now();
    let mut c = ChaseController::new(ChaseConfig {
        max_lost_frames: 1,
        search_timeout: Duration::from_millis(120),
        ..ChaseConfig::default()
    });
    c.tick(Some(TargetSample::new(600.0, 240.0, REF)), Readiness::Ready, t0);

    // search starts at t0 + 50ms, 150ms later the sweep has run too long
    let dirs: Vec<Direction> = (1..=5)
        .map(|i| c.tick(None, Readiness::Ready, t0 + TICK * i).command.direction())
        .collect();
    assert_eq!(
        dirs,
        vec![
            Direction::TurnRight,
            Direction::TurnRight,
            Direction::TurnRight,
            Direction::TurnLeft,
            Direction::TurnLeft
        ]
    );
}

#[test]
fn estop_then_ready_clears_tracking() {
    let t0 = Instant::now();
    let mut c = ChaseController::new(ChaseConfig {
        max_lost_frames: 2,
        ..ChaseConfig::default()
    });
    c.tick(Some(TargetSample::new(600.0, 240.0, 0.2 * REF)), Readiness::Ready, t0);
    for i in 1..6 {
        c.tick(None, Readiness::Ready, t0 + TICK * i);
    }
    assert_eq!(c.state().mode, TrackerMode::Searching);

    let out = c.tick(Some(TargetSample::new(600.0, 240.0, REF)), Readiness::EStop, t0 + TICK * 6);
    assert_eq!(out.command, MotionCommand::STOP);
    assert!(out.dispatch);

    let out = c.tick(
        Some(TargetSample::new(320.0, 240.0, REF)),
        Readiness::Ready,
        t0 + TICK * 7,
    );
    let state = c.state();
    assert_eq!(state.lost_count, 0);
    assert_eq!(state.mode, TrackerMode::Pursuing);
    assert_eq!(out.mode, TrackerMode::Pursuing);
}

#[test]
fn approach_slows_and_stops_on_arrival() {
    let t0 = Instant::now();
    let mut c = controller();
    let mut speeds = Vec::new();
    // target above center growing from far away to past the standoff size
    for i in 0..60u32 {
        let ratio = REF * (0.05 + 0.02 * i as f64);
        let out = c.tick(Some(TargetSample::new(320.0, 100.0, ratio)), Readiness::Ready, t0 + TICK * i);
        speeds.push((out.command.direction(), out.command.speed()));
    }
    let (last_dir, last_speed) = speeds[speeds.len() - 1];
    assert_eq!(last_dir, Direction::Stop);
    assert_eq!(last_speed, 0);
    assert!(speeds.iter().any(|(d, s)| *d == Direction::Forward && *s > 30));
}

fn sample_strategy() -> impl Strategy<Value = Option<TargetSample>> {
    prop::option::of((0.0..640.0f64, 0.0..480.0f64, 0.0..0.1f64).prop_map(|(x, y, r)| TargetSample::new(x, y, r)))
}

fn readiness_strategy() -> impl Strategy<Value = Readiness> {
    prop_oneof![
        8 => Just(Readiness::Ready),
        1 => Just(Readiness::Moving),
        1 => Just(Readiness::EStop),
    ]
}

proptest! {
    #[test]
    fn moving_commands_stay_in_speed_range(
        ticks in prop::collection::vec((sample_strategy(), readiness_strategy(), 1u64..200), 1..120)
    ) {
        let config = ChaseConfig::default();
        let (min, max) = (config.min_speed, config.max_speed);
        let mut c = ChaseController::new(config);
        let mut now = Instant::now();
        for (sample, readiness, step_ms) in ticks {
            now += Duration::from_millis(step_ms);
            let cmd = c.tick(sample, readiness, now).command;
            if cmd.is_stop() {
                prop_assert_eq!(cmd.speed(), 0);
            } else {
                prop_assert!(cmd.speed() >= min && cmd.speed() <= max);
            }
        }
    }

    #[test]
    fn estop_always_stops_within_one_tick(
        ticks in prop::collection::vec((sample_strategy(), readiness_strategy()), 0..60),
        after in (100.0..540.0f64, 100.0..380.0f64, 0.001..0.05f64),
    ) {
        let t0 = Instant::now();
        let mut c = controller();
        let mut i = 0u32;
        for (sample, readiness) in ticks {
            c.tick(sample, readiness, t0 + TICK * i);
            i += 1;
        }

        let out = c.tick(None, Readiness::EStop, t0 + TICK * i);
        prop_assert_eq!(out.command, MotionCommand::STOP);
        prop_assert!(out.dispatch);

        let (x, y, r) = after;
        c.tick(Some(TargetSample::new(x, y, r)), Readiness::Ready, t0 + TICK * (i + 1));
        prop_assert_eq!(c.state().lost_count, 0);
        prop_assert_eq!(c.state().mode, TrackerMode::Pursuing);
    }

    #[test]
    fn forward_speed_respects_acceleration(
        samples in prop::collection::vec((0.0..150.0f64, 0.01..0.9f64), 1..80)
    ) {
        let config = ChaseConfig::default();
        let cap = config.max_acceleration * TICK.as_secs_f64();
        let t0 = Instant::now();
        let mut c = ChaseController::new(config);
        let mut previous: Option<u16> = None;
        for (i, (y, proportion)) in samples.into_iter().enumerate() {
            let sample = TargetSample::new(320.0, y, proportion * REF);
            let cmd = c.tick(Some(sample), Readiness::Ready, t0 + TICK * i as u32).command;
            prop_assert_eq!(cmd.direction(), Direction::Forward);
            if let Some(prev) = previous {
                prop_assert!((cmd.speed() as f64 - prev as f64).abs() <= cap + 1e-9);
            }
            previous = Some(cmd.speed());
        }
    }

    #[test]
    fn forward_ramp_survives_losses_and_searches(
        ticks in prop::collection::vec(
            (prop::option::weighted(0.6, (0.0..150.0f64, 0.01..0.9f64)), readiness_strategy()),
            1..150,
        )
    ) {
        let config = ChaseConfig {
            max_lost_frames: 3,
            ..ChaseConfig::default()
        };
        let cap = config.max_acceleration * TICK.as_secs_f64();
        let t0 = Instant::now();
        let mut c = ChaseController::new(config);
        let mut previous = 0.0;
        for (i, (seen, readiness)) in ticks.into_iter().enumerate() {
            let sample = seen.map(|(y, proportion)| TargetSample::new(320.0, y, proportion * REF));
            let cmd = c.tick(sample, readiness, t0 + TICK * i as u32).command;
            let translation = if cmd.direction().is_translation() { cmd.speed() as f64 } else { 0.0 };
            // slowing down is a stop and always allowed, speeding up is capped
            prop_assert!(translation - previous <= cap + 1e-9, "tick {}: {} -> {}", i, previous, translation);
            previous = translation;
        }
    }

    #[test]
    fn search_follows_last_side(x in 330.0..640.0f64, lost in 1u32..30) {
        let t0 = Instant::now();
        let mut c = ChaseController::new(ChaseConfig {
            max_lost_frames: lost,
            ..ChaseConfig::default()
        });
        c.tick(Some(TargetSample::new(x, 240.0, REF)), Readiness::Ready, t0);
        for i in 1..=lost + 1 {
            c.tick(None, Readiness::Ready, t0 + TICK * i);
        }
        prop_assert_eq!(c.state().mode, TrackerMode::Searching);
        prop_assert_eq!(c.state().search_direction.sign(), 1);
    }
}
