//! Monitor service - the monitor on a tokio task
//!
//! Frames, ticks, transcripts and control requests are serialized through
//! one queue, so the monitor itself never needs a lock. Readers get a
//! snapshot refreshed after every event. Assistant and search calls run
//! on their own tasks; the tick never waits on them.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use studylens_core::{DetectionFrame, StudyError, StudyResult, Timestamp};
use studylens_time::Clock;
use studylens_visual::DoubtTransition;
use studylens_voice::RecognitionEvent;

use crate::{Inquiry, InquiryOutcome, Monitor, MonitorSnapshot};

/// Requests accepted by the monitor task
#[derive(Debug)]
pub enum MonitorCommand {
    Start(oneshot::Sender<StudyResult<()>>),
    Frame(DetectionFrame),
    Recognition(RecognitionEvent),
    Transcript(String),
    ToggleDoubt(oneshot::Sender<StudyResult<DoubtTransition>>),
    ReadAloud(usize, oneshot::Sender<StudyResult<()>>),
    Stop(oneshot::Sender<bool>),
    Shutdown,
}

/// Handle to a running monitor task; clones share the same task
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::Sender<MonitorCommand>,
    snapshot: Arc<RwLock<MonitorSnapshot>>,
    clock: Arc<dyn Clock>,
    task: Arc<Mutex<Option<JoinHandle<Monitor>>>>,
}

/// Move the monitor onto a tokio task.
/// Frame timestamps must come from `clock` (see [`MonitorHandle::now`]).
pub fn spawn_monitor(monitor: Monitor, clock: Arc<dyn Clock>) -> MonitorHandle {
    let (tx, rx) = mpsc::channel(monitor.config().event_queue.max(1));
    let snapshot = Arc::new(RwLock::new(monitor.snapshot()));

    let task = tokio::spawn(run(monitor, rx, snapshot.clone(), clock.clone()));

    MonitorHandle {
        commands: tx,
        snapshot,
        clock,
        task: Arc::new(Mutex::new(Some(task))),
    }
}

async fn run(
    mut monitor: Monitor,
    mut commands: mpsc::Receiver<MonitorCommand>,
    snapshot: Arc<RwLock<MonitorSnapshot>>,
    clock: Arc<dyn Clock>,
) -> Monitor {
    let mut ticker = interval(monitor.config().tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut inquiries = JoinSet::new();

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("all monitor handles dropped");
                    break;
                };
                let flow = dispatch(&mut monitor, command, clock.as_ref(), &mut ticker);
                match flow {
                    Flow::Continue => {}
                    Flow::Ask(inquiry) => {
                        inquiries.spawn(inquiry.resolve());
                    }
                    Flow::Exit => break,
                }
            }
            _ = ticker.tick() => {
                if monitor.is_camera_active() {
                    monitor.on_tick(clock.now());
                }
            }
            Some(joined) = inquiries.join_next(), if !inquiries.is_empty() => {
                settle(&mut monitor, joined, clock.as_ref());
            }
        }
        *snapshot.write() = monitor.snapshot();
    }

    // Questions already asked still get their answers
    while let Some(joined) = inquiries.join_next().await {
        settle(&mut monitor, joined, clock.as_ref());
    }
    monitor.stop();
    *snapshot.write() = monitor.snapshot();
    info!("monitor task finished");
    monitor
}

/// What the loop does after a command
enum Flow {
    Continue,
    Ask(Inquiry),
    Exit,
}

fn dispatch(
    monitor: &mut Monitor,
    command: MonitorCommand,
    clock: &dyn Clock,
    ticker: &mut Interval,
) -> Flow {
    match command {
        MonitorCommand::Start(reply) => {
            let was_running = monitor.is_camera_active();
            let result = monitor.start(clock.now());
            if result.is_ok() && !was_running {
                // First evaluation one full interval after the camera opens
                ticker.reset();
            }
            let _ = reply.send(result);
        }
        MonitorCommand::Frame(frame) => monitor.on_frame(&frame),
        MonitorCommand::Recognition(event) => {
            if let Some(inquiry) = monitor.on_recognition(&event) {
                return Flow::Ask(inquiry);
            }
        }
        MonitorCommand::Transcript(text) => {
            if let Some(inquiry) = monitor.on_transcript_finalized(&text) {
                return Flow::Ask(inquiry);
            }
        }
        MonitorCommand::ToggleDoubt(reply) => {
            let _ = reply.send(monitor.toggle_doubt_mode());
        }
        MonitorCommand::ReadAloud(turn, reply) => {
            let _ = reply.send(monitor.read_aloud(turn));
        }
        MonitorCommand::Stop(reply) => {
            let _ = reply.send(monitor.stop());
        }
        MonitorCommand::Shutdown => return Flow::Exit,
    }
    Flow::Continue
}

fn settle(monitor: &mut Monitor, joined: Result<InquiryOutcome, JoinError>, clock: &dyn Clock) {
    match joined {
        Ok(outcome) => monitor.on_inquiry_resolved(outcome, clock.now()),
        Err(e) => {
            warn!("inquiry task failed: {}", e);
            monitor.on_inquiry_lost();
        }
    }
}

impl MonitorHandle {
    /// Current time on the monitor's timeline
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Start the camera; errors are those of [`Monitor::start`]
    pub async fn start(&self) -> StudyResult<()> {
        self.request(MonitorCommand::Start).await?
    }

    /// Queue a frame, waiting for room
    pub async fn send_frame(&self, frame: DetectionFrame) -> StudyResult<()> {
        self.send(MonitorCommand::Frame(frame)).await
    }

    /// Queue a frame without waiting; the frame is dropped if the queue is full
    pub fn offer_frame(&self, frame: DetectionFrame) -> bool {
        match self.commands.try_send(MonitorCommand::Frame(frame)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("monitor queue full, frame dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    pub async fn recognition(&self, event: RecognitionEvent) -> StudyResult<()> {
        self.send(MonitorCommand::Recognition(event)).await
    }

    pub async fn transcript(&self, text: impl Into<String>) -> StudyResult<()> {
        self.send(MonitorCommand::Transcript(text.into())).await
    }

    pub async fn toggle_doubt_mode(&self) -> StudyResult<DoubtTransition> {
        self.request(MonitorCommand::ToggleDoubt).await?
    }

    pub async fn read_aloud(&self, turn: usize) -> StudyResult<()> {
        self.request(|reply| MonitorCommand::ReadAloud(turn, reply)).await?
    }

    /// Stop voice capture and the camera and wait until both are released.
    /// Returns false if nothing was running, including after shutdown.
    pub async fn stop(&self) -> bool {
        self.request(MonitorCommand::Stop).await.unwrap_or(false)
    }

    /// End the task and take the monitor back; devices are released first
    pub async fn shutdown(&self) -> StudyResult<Monitor> {
        let task = self.task.lock().take().ok_or(StudyError::MonitorClosed)?;
        let _ = self.commands.send(MonitorCommand::Shutdown).await;
        task.await.map_err(|_| StudyError::MonitorClosed)
    }

    /// Latest monitor state
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.snapshot.read().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, command: MonitorCommand) -> StudyResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| StudyError::MonitorClosed)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> MonitorCommand,
    ) -> StudyResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(command(tx)).await?;
        rx.await.map_err(|_| StudyError::MonitorClosed)
    }
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}
