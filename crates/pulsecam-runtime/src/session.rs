//! Capture session worker.
//!
//! Architecture:
//! - One worker thread owns the engine, the capture device, and the
//!   observer; all state mutation happens there
//! - Bounded command channel; frames use `try_send` and drop with a
//!   counter under backpressure, lifecycle commands always enqueue
//! - `start`/`stop` return without blocking the caller and serialize on
//!   the worker, so the hardware is never double-acquired or released
//!   while a frame is mid-flight
//! - Stopping turns the torch off and releases the camera before the stop
//!   is acknowledged, then force-resets the engine so a later start never
//!   observes a stale window

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use pulsecam_core::{DecisionRecord, EngineConfig, PulseEngine};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use thiserror::Error;

use crate::device::CaptureDevice;
use crate::frame::Frame;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session worker disconnected")]
    WorkerGone,
    #[error("frame channel full")]
    ChannelFull,
}

/// Worker counters tracked atomically.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    pub frames_processed: AtomicU64,
    pub frames_dropped: AtomicU64,
    pub frames_unreadable: AtomicU64,
    pub bpm_updates: AtomicU64,
}

impl SessionMetrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_unreadable: self.frames_unreadable.load(Ordering::Relaxed),
            bpm_updates: self.bpm_updates.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub frames_processed: u64,
    pub frames_dropped: u64,
    pub frames_unreadable: u64,
    pub bpm_updates: u64,
}

/// Result of a completed (or empty) measurement session.
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub duration_sec: f32,
    pub frames_processed: u64,
    pub frames_dropped: u64,
    /// Most recent validated rate, if any was produced.
    pub last_bpm: Option<u32>,
    /// Mean of all validated rates during the session.
    pub avg_bpm: Option<f32>,
}

/// Commands handled by the worker thread.
enum SessionCmd {
    Start,
    Stop {
        response_tx: Option<Sender<SessionSummary>>,
    },
    Frame(Frame),
    Shutdown,
}

/// Observer invoked once per processed frame with a complete record.
pub type Observer = Box<dyn FnMut(DecisionRecord) + Send>;

/// Handle to a capture session worker.
///
/// The handle is shared freely across threads; every command funnels into
/// the single worker, which processes one frame to completion before
/// accepting the next.
pub struct CaptureSession {
    tx: Sender<SessionCmd>,
    metrics: Arc<SessionMetrics>,
    active: Arc<AtomicBool>,
    last_decision: Arc<Mutex<DecisionRecord>>,
    worker_thread: Option<thread::JoinHandle<()>>,
}

impl CaptureSession {
    /// Spawn the worker around an engine, a device, and an observer.
    pub fn spawn(
        config: EngineConfig,
        device: Box<dyn CaptureDevice>,
        observer: Observer,
    ) -> Self {
        let (tx, rx) = bounded(CHANNEL_CAPACITY);
        let metrics = Arc::new(SessionMetrics::default());
        let active = Arc::new(AtomicBool::new(false));
        let last_decision = Arc::new(Mutex::new(DecisionRecord::default()));

        let worker = Worker {
            engine: PulseEngine::with_config(config),
            device,
            observer,
            metrics: Arc::clone(&metrics),
            active: Arc::clone(&active),
            last_decision: Arc::clone(&last_decision),
            running: false,
            started_at: None,
            start_metrics: MetricsSnapshot::default(),
            last_bpm: None,
            bpm_sum: 0.0,
            bpm_count: 0,
        };

        let worker_thread = thread::spawn(move || worker.run(rx));

        CaptureSession {
            tx,
            metrics,
            active,
            last_decision,
            worker_thread: Some(worker_thread),
        }
    }

    /// Begin capturing. Returns immediately; acquisition happens on the
    /// worker. A start while already running is ignored there.
    pub fn start(&self) -> Result<(), SessionError> {
        self.tx
            .send(SessionCmd::Start)
            .map_err(|_| SessionError::WorkerGone)
    }

    /// Stop capturing. Returns immediately; the torch is switched off and
    /// the camera released on the worker before any later start runs.
    pub fn stop(&self) -> Result<(), SessionError> {
        self.tx
            .send(SessionCmd::Stop { response_tx: None })
            .map_err(|_| SessionError::WorkerGone)
    }

    /// Stop capturing and wait for the summary of the finished session.
    pub fn stop_sync(&self) -> Result<SessionSummary, SessionError> {
        let (response_tx, response_rx) = bounded(1);
        self.tx
            .send(SessionCmd::Stop {
                response_tx: Some(response_tx),
            })
            .map_err(|_| SessionError::WorkerGone)?;
        response_rx.recv().map_err(|_| SessionError::WorkerGone)
    }

    /// Push one captured frame. Non-blocking: under backpressure the
    /// frame is counted and dropped, which the engine treats as "no
    /// sample this tick".
    pub fn submit_frame(&self, frame: Frame) -> Result<(), SessionError> {
        match self.tx.try_send(SessionCmd::Frame(frame)) {
            Ok(()) => Ok(()),
            Err(crossbeam_channel::TrySendError::Full(_)) => {
                self.metrics.frames_dropped.fetch_add(1, Ordering::Relaxed);
                Err(SessionError::ChannelFull)
            }
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                Err(SessionError::WorkerGone)
            }
        }
    }

    /// Whether the worker currently holds the camera.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Latest complete decision, for pull-style observation.
    pub fn last_decision(&self) -> DecisionRecord {
        *self.last_decision.lock()
    }

    /// Current counters snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let _ = self.tx.send(SessionCmd::Shutdown);
        if let Some(handle) = self.worker_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Worker-side state, confined to the worker thread.
struct Worker {
    engine: PulseEngine,
    device: Box<dyn CaptureDevice>,
    observer: Observer,
    metrics: Arc<SessionMetrics>,
    active: Arc<AtomicBool>,
    last_decision: Arc<Mutex<DecisionRecord>>,
    running: bool,
    started_at: Option<Instant>,
    /// Counter values at session start, so summaries report per-session
    /// deltas while the atomic counters stay cumulative.
    start_metrics: MetricsSnapshot,
    last_bpm: Option<u32>,
    bpm_sum: f64,
    bpm_count: u64,
}

impl Worker {
    fn run(mut self, rx: Receiver<SessionCmd>) {
        loop {
            match rx.recv() {
                Ok(SessionCmd::Start) => self.handle_start(),
                Ok(SessionCmd::Stop { response_tx }) => {
                    let summary = self.handle_stop();
                    if let Some(tx) = response_tx {
                        let _ = tx.send(summary);
                    }
                }
                Ok(SessionCmd::Frame(frame)) => self.handle_frame(frame),
                Ok(SessionCmd::Shutdown) | Err(_) => break,
            }
        }

        // Cancellation safety: never leave the torch on or the camera held.
        if self.running {
            self.handle_stop();
        }
    }

    fn handle_start(&mut self) {
        if self.running {
            log::warn!("capture session already running, ignoring start");
            return;
        }

        if let Err(e) = self.device.acquire() {
            log::error!("failed to acquire capture device: {}", e);
            return;
        }
        if let Err(e) = self.device.set_torch(true) {
            log::warn!("torch activation failed: {}", e);
        }

        self.engine.reset();
        self.running = true;
        self.started_at = Some(Instant::now());
        self.start_metrics = self.metrics.snapshot();
        self.last_bpm = None;
        self.bpm_sum = 0.0;
        self.bpm_count = 0;
        self.active.store(true, Ordering::Relaxed);
        log::info!("capture session started");
    }

    fn handle_stop(&mut self) -> SessionSummary {
        if !self.running {
            return SessionSummary::default();
        }

        // Torch off before the camera goes away.
        if let Err(e) = self.device.set_torch(false) {
            log::warn!("torch deactivation failed: {}", e);
        }
        if let Err(e) = self.device.release() {
            log::warn!("device release failed: {}", e);
        }

        self.engine.reset();
        self.running = false;
        self.active.store(false, Ordering::Relaxed);
        *self.last_decision.lock() = DecisionRecord::default();

        let duration_sec = self
            .started_at
            .take()
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        let snapshot = self.metrics.snapshot();
        let frames_processed = snapshot.frames_processed - self.start_metrics.frames_processed;
        let frames_dropped = snapshot.frames_dropped - self.start_metrics.frames_dropped;
        let avg_bpm = if self.bpm_count > 0 {
            Some((self.bpm_sum / self.bpm_count as f64) as f32)
        } else {
            None
        };

        log::info!(
            "capture session stopped after {:.1}s ({} frames)",
            duration_sec,
            frames_processed
        );

        SessionSummary {
            duration_sec,
            frames_processed,
            frames_dropped,
            last_bpm: self.last_bpm,
            avg_bpm,
        }
    }

    fn handle_frame(&mut self, frame: Frame) {
        if !self.running {
            return;
        }

        let sample = match frame.mean_rgb() {
            Some(sample) => sample,
            None => {
                // Unreadable frame: skip the tick without touching state.
                self.metrics.frames_unreadable.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let record = self.engine.process(sample, frame.timestamp_us);
        self.metrics.frames_processed.fetch_add(1, Ordering::Relaxed);

        if let Some(bpm) = record.bpm {
            self.metrics.bpm_updates.fetch_add(1, Ordering::Relaxed);
            self.last_bpm = Some(bpm);
            self.bpm_sum += bpm as f64;
            self.bpm_count += 1;
        }

        // Publish the complete record, then notify.
        *self.last_decision.lock() = record;
        (self.observer)(record);
    }
}
