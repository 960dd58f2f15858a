//! Chases a simulated target through the async control loop.
//!
//! The target drifts across the frame while approaching, drops out of view
//! for a couple of seconds, comes back on the other side, and finally the
//! platform is e-stopped.
//!
//! ```text
//! cargo run --example follow [config.yaml]
//! ```

use std::time::Duration;

use chaser::{
    ChaseConfig, ChaseController, MotionCommand, Readiness, TargetSample, error::DispatchError, fs::logger,
    runtime::ControlLoop,
};
use log::{LevelFilter, Log, error, info};

const TICKS: u32 = 160;

/// Where the simulated detector sees the target on tick `i`.
fn simulated_target(i: u32, config: &ChaseConfig) -> Option<TargetSample> {
    let t = i as f64 / TICKS as f64;
    match i {
        // out of view
        60..=100 => None,
        _ => {
            let width = config.frame_width as f64;
            let x = if i < 60 { width * (0.2 + 0.5 * t) } else { width * (0.9 - 0.6 * (t - 0.6)) };
            let y = config.frame_height as f64 * 0.25;
            // grows from a quarter of the standoff size to past it
            let ratio = config.reference_ratio * (0.25 + 0.9 * t);
            Some(TargetSample::new(x, y, ratio))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = logger::init(LevelFilter::Info, Some("follow.log")) {
        eprintln!("Logger init failed: {}", e);
    }

    let config = match std::env::args().nth(1) {
        Some(path) => match ChaseConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Could not load {}: {}", path, e);
                return;
            }
        },
        None => ChaseConfig::default(),
    };
    let period = config.tick_period;

    let dispatcher = |cmd: MotionCommand| -> Result<(), DispatchError> {
        info!("-> {} (code {})", cmd, cmd.direction().code());
        Ok(())
    };
    let (handle, task) = ControlLoop::spawn(ChaseController::new(config.clone()), dispatcher);

    let mut ticker = tokio::time::interval(period);
    for i in 0..TICKS {
        ticker.tick().await;
        if !handle.submit(simulated_target(i, &config)) {
            error!("Control loop exited early");
            break;
        }
    }

    handle.set_readiness(Readiness::EStop);
    tokio::time::sleep(Duration::from_millis(100)).await;
    info!("Last command: {}", handle.latest_command());

    drop(handle);
    if let Err(e) = task.await {
        error!("Control loop panicked: {}", e);
    }
    log::logger().flush();
}
