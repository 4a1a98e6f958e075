//! Async driver - runs a controller on one tokio task
//!
//! Commands arrive over an unbounded channel, reveal deadlines are awaited
//! with `sleep_until`, and both are handled by the same task, one at a time.
//! After every step the task forwards emissions and republishes the shared
//! snapshot.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use petal_core::{MonoTime, PetalError, PetalResult, Point3};
use petal_time::Clock;

use crate::{Controller, Detection, DetectorStatus, Emission, RuntimeConfig, RuntimeStats, Snapshot};

/// Session clock on tokio's time source, so paused test time applies
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The tokio instant of a session time
    pub fn instant_at(&self, t: MonoTime) -> Instant {
        self.origin + t.as_duration()
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> MonoTime {
        MonoTime::from_duration(self.origin.elapsed())
    }
}

#[derive(Debug)]
enum Command {
    Detect(Detection),
    Points(Vec<Point3>),
    Toggle,
    Status(DetectorStatus),
    Shutdown,
}

/// Cloneable handle into a running driver
#[derive(Debug, Clone)]
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl DriverHandle {
    /// Send one detector callback. Fails once the detector is reported
    /// unavailable.
    pub fn send_detection(&self, detection: Detection) -> PetalResult<()> {
        self.snapshot.read().detector.ensure_available()?;
        self.send(Command::Detect(detection))
    }

    /// Send raw landmarks; validation happens on the driver task
    pub fn send_points(&self, points: Vec<Point3>) -> PetalResult<()> {
        self.snapshot.read().detector.ensure_available()?;
        self.send(Command::Points(points))
    }

    pub fn toggle(&self) -> PetalResult<()> {
        self.send(Command::Toggle)
    }

    pub fn set_detector_status(&self, status: DetectorStatus) -> PetalResult<()> {
        self.send(Command::Status(status))
    }

    /// Ask the driver to cancel all deadlines and stop
    pub fn shutdown(&self) -> PetalResult<()> {
        self.send(Command::Shutdown)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.read().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command) -> PetalResult<()> {
        self.commands
            .send(command)
            .map_err(|_| PetalError::ChannelClosed)
    }
}

/// A spawned driver
pub struct Driver {
    pub handle: DriverHandle,
    pub emissions: mpsc::UnboundedReceiver<Emission>,
    /// Resolves with the final statistics once the task stops
    pub task: JoinHandle<RuntimeStats>,
}

/// Spawn a controller on the current tokio runtime.
///
/// The task stops on an explicit shutdown or once every [`DriverHandle`] is
/// dropped; either way all deadlines are cancelled first.
pub fn spawn_driver(config: &RuntimeConfig, clock: TokioClock) -> PetalResult<Driver> {
    let controller = Controller::new(config, clock)?;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (emission_tx, emission_rx) = mpsc::unbounded_channel();
    let snapshot = Arc::new(RwLock::new(controller.snapshot()));

    let task = tokio::spawn(run(
        controller,
        command_rx,
        emission_tx,
        Arc::clone(&snapshot),
    ));

    Ok(Driver {
        handle: DriverHandle {
            commands: command_tx,
            snapshot,
        },
        emissions: emission_rx,
        task,
    })
}

async fn run(
    mut controller: Controller<TokioClock>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    emissions: mpsc::UnboundedSender<Emission>,
    snapshot: Arc<RwLock<Snapshot>>,
) -> RuntimeStats {
    tracing::debug!("driver started");

    loop {
        let deadline = controller
            .next_deadline()
            .map(|t| controller.clock().instant_at(t));

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Detect(detection)) => controller.ingest(detection),
                Some(Command::Points(points)) => controller.ingest_points(&points),
                Some(Command::Toggle) => controller.toggle(),
                Some(Command::Status(status)) => controller.set_detector_status(status),
                Some(Command::Shutdown) | None => controller.shutdown(),
            },
            _ = sleep_until(deadline) => controller.poll_timers(),
        }

        publish(&mut controller, &emissions, &snapshot);

        if controller.is_shut_down() {
            break;
        }
    }

    tracing::debug!(stats = ?controller.stats(), "driver stopped");
    controller.stats().clone()
}

/// Sleep until `deadline`, or forever when there is none
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn publish(
    controller: &mut Controller<TokioClock>,
    emissions: &mpsc::UnboundedSender<Emission>,
    snapshot: &RwLock<Snapshot>,
) {
    for emission in controller.drain() {
        tracing::trace!(kind = emission.kind(), "publish");
        // Consumers may have gone away; the snapshot is still kept current
        if emissions.send(emission).is_err() {
            break;
        }
    }
    *snapshot.write() = controller.snapshot();
}
