//! Asynchronous control loop.
//!
//! The loop runs as its own tokio task and owns the [`ChaseController`]. Vision
//! and actuator code talk to it through a [`ControlHandle`]:
//!
//! - Detections go in through a `watch` channel. If the producer outruns the
//!   loop, older frames are overwritten, never queued.
//! - Readiness changes wake the loop on their own, so an e-stop is answered
//!   without waiting for the next frame.
//! - Each dispatched command is handed to the [`Dispatcher`] exactly once and
//!   published on a `watch` channel for observers.
//!
//! Dropping the handle stops the loop after a final `STOP`.
//!
//! # Example
//!
//! ```ignore
//! use chaser::{runtime::ControlLoop, ChaseConfig, ChaseController, TargetSample};
//!
//! let controller = ChaseController::new(ChaseConfig::default());
//! let (handle, task) = ControlLoop::spawn(controller, |cmd| {
//!     println!("{}", cmd);
//!     Ok(())
//! });
//! handle.submit(Some(TargetSample::new(400.0, 200.0, 0.01)));
//! ```

use log::{info, warn};
use tokio::{sync::watch, task::JoinHandle, time::Instant};

use crate::{
    controller::{ChaseController, ControlOutput, Readiness},
    error::DispatchError,
    motion::command::MotionCommand,
    tracking::sample::TargetSample,
};

/// Receives the commands the loop decides to send.
///
/// Implementations own the wire protocol. An error is logged by the loop and
/// not retried.
pub trait Dispatcher: Send + 'static {
    fn dispatch(&mut self, command: MotionCommand) -> Result<(), DispatchError>;
}

impl<F> Dispatcher for F
where
    F: FnMut(MotionCommand) -> Result<(), DispatchError> + Send + 'static,
{
    fn dispatch(&mut self, command: MotionCommand) -> Result<(), DispatchError> { self(command) }
}

/// Caller side of a running control loop.
pub struct ControlHandle {
    samples:   watch::Sender<Option<TargetSample>>,
    readiness: watch::Sender<Readiness>,
    commands:  watch::Receiver<MotionCommand>,
}

impl ControlHandle {
    /// Hands over this tick's detection (`None` for "nothing seen").
    ///
    /// Returns `false` once the loop has exited.
    pub fn submit(&self, sample: Option<TargetSample>) -> bool { self.samples.send(sample).is_ok() }

    /// Updates platform readiness. Non-ready values take effect immediately.
    pub fn set_readiness(&self, readiness: Readiness) -> bool { self.readiness.send(readiness).is_ok() }

    /// The most recently dispatched command.
    pub fn latest_command(&self) -> MotionCommand { *self.commands.borrow() }

    /// A fresh subscription to dispatched commands.
    pub fn commands(&self) -> watch::Receiver<MotionCommand> { self.commands.clone() }
}

/// Spawner for the control task.
pub struct ControlLoop;

impl ControlLoop {
    /// Spawns the control loop on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    pub fn spawn<D: Dispatcher>(controller: ChaseController, dispatcher: D) -> (ControlHandle, JoinHandle<()>) {
        let (sample_tx, sample_rx) = watch::channel(None);
        let (ready_tx, ready_rx) = watch::channel(Readiness::Ready);
        let (command_tx, command_rx) = watch::channel(MotionCommand::STOP);

        let task = tokio::spawn(control_loop(controller, sample_rx, ready_rx, command_tx, dispatcher));

        let handle = ControlHandle {
            samples:   sample_tx,
            readiness: ready_tx,
            commands:  command_rx,
        };
        (handle, task)
    }
}

async fn control_loop<D: Dispatcher>(
    mut controller: ChaseController,
    mut samples: watch::Receiver<Option<TargetSample>>,
    mut readiness: watch::Receiver<Readiness>,
    commands: watch::Sender<MotionCommand>,
    mut dispatcher: D,
) {
    info!("Chase control loop started");

    loop {
        tokio::select! {
            biased;

            changed = readiness.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *readiness.borrow_and_update();
                if state != Readiness::Ready {
                    let out = controller.tick(None, state, now());
                    deliver(out, &mut dispatcher, &commands);
                }
            }

            changed = samples.changed() => {
                if changed.is_err() {
                    break;
                }
                let sample = *samples.borrow_and_update();
                let state = *readiness.borrow();
                let out = controller.tick(sample, state, now());
                deliver(out, &mut dispatcher, &commands);
            }
        }
    }

    if let Err(e) = dispatcher.dispatch(MotionCommand::STOP) {
        warn!("Final stop could not be dispatched: {}", e);
    }
    commands.send_replace(MotionCommand::STOP);
    info!("Chase control loop stopped");
}

fn deliver<D: Dispatcher>(out: ControlOutput, dispatcher: &mut D, commands: &watch::Sender<MotionCommand>) {
    if !out.dispatch {
        return;
    }
    if let Err(e) = dispatcher.dispatch(out.command) {
        warn!("Dispatch of {} failed: {}", out.command, e);
    }
    commands.send_replace(out.command);
}

fn now() -> std::time::Instant { Instant::now().into_std() }
