//! Debounced background execution of the expansion pipeline.
//!
//! [`ExpansionJob`] owns a single worker thread that acts as a one-slot
//! executor: at most one run is in flight, and of all requests that arrive
//! meanwhile only the newest is kept. Requests wait out a short debounce
//! window before they start, so a burst of parameter changes costs one
//! run. Results and progress are published as [`JobEvent`]s on channels
//! obtained from [`ExpansionJob::subscribe`].

use crate::error::JobError;
use crate::imageops_expand::config::{BlendConfig, ExpansionSpec};
use crate::imageops_expand::context::{CancellationToken, RunContext};
use crate::imageops_expand::pipeline::expand_background;
use crate::Image;
use image::Rgba;
use log::{debug, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Delay between the last request and the start of a run.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Lifecycle of an [`ExpansionJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    /// A request is waiting for its debounce deadline.
    Pending,
    Running,
    /// Cancellation was requested; the run stops at its next checkpoint.
    Cancelling,
}

/// Notifications published by a job.
#[derive(Debug, Clone)]
pub enum JobEvent {
    Started,
    Progress(u8),
    Result(Arc<Image<Rgba<u8>>>),
    Error(String),
    Finished,
}

/// Source image and expansion amounts for one run.
///
/// Two requests are equal when they share the same image allocation and
/// carry the same spec; pixels are never compared.
#[derive(Debug, Clone)]
pub struct ExpansionRequest {
    pub image: Arc<Image<Rgba<u8>>>,
    pub spec: ExpansionSpec,
}

impl ExpansionRequest {
    pub fn new(image: Arc<Image<Rgba<u8>>>, spec: ExpansionSpec) -> Self {
        Self { image, spec }
    }
}

impl PartialEq for ExpansionRequest {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image) && self.spec == other.spec
    }
}

/// Construction-time settings for an [`ExpansionJob`].
#[derive(Debug, Clone, Copy)]
pub struct JobOptions {
    pub debounce: Duration,
    pub blend: BlendConfig,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            blend: BlendConfig::default(),
        }
    }
}

/// Send side of the event contract.
#[derive(Default)]
struct EventSink {
    subscribers: Mutex<Vec<Sender<JobEvent>>>,
    last_progress: AtomicU8,
}

impl EventSink {
    fn subscribe(&self) -> Receiver<JobEvent> {
        let (tx, rx) = mpsc::channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    fn emit(&self, event: JobEvent) {
        lock(&self.subscribers).retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn started(&self) {
        self.last_progress.store(0, Ordering::SeqCst);
        self.emit(JobEvent::Started);
    }

    /// Drops values lower than the last one sent in this run.
    fn progress(&self, percentage: u8) {
        let previous = self.last_progress.fetch_max(percentage, Ordering::SeqCst);
        if percentage >= previous {
            self.emit(JobEvent::Progress(percentage));
        }
    }

    fn result(&self, image: Image<Rgba<u8>>) {
        self.emit(JobEvent::Result(Arc::new(image)));
    }

    fn error(&self, message: String) {
        self.emit(JobEvent::Error(message));
    }

    fn finished(&self) {
        self.emit(JobEvent::Finished);
    }
}

#[derive(Debug)]
struct PendingRequest {
    request: ExpansionRequest,
    deadline: Instant,
}

/// Bookkeeping guarded by the job's lock. Every method is O(1).
#[derive(Debug)]
struct Inner {
    phase: JobState,
    pending: Option<PendingRequest>,
    running: Option<ExpansionRequest>,
    enabled: bool,
    config: BlendConfig,
    debounce: Duration,
    shutdown: bool,
}

impl Inner {
    fn new(options: JobOptions) -> Self {
        Self {
            phase: JobState::Idle,
            pending: None,
            running: None,
            enabled: true,
            config: options.blend,
            debounce: options.debounce,
            shutdown: false,
        }
    }

    /// Records `request` as the next run. Returns `true` if the worker
    /// needs waking.
    fn schedule(&mut self, request: ExpansionRequest, now: Instant) -> bool {
        if !self.enabled {
            debug!("processing disabled, request ignored");
            return false;
        }

        let (width, height) = request.image.dimensions();
        if width == 0 || height == 0 {
            debug!("empty source image, request ignored");
            return false;
        }

        if request.spec.is_noop() {
            debug!("no expansion requested, dropping pending work");
            self.pending = None;
            if self.phase == JobState::Pending {
                self.phase = JobState::Idle;
            }
            return false;
        }

        if self.phase == JobState::Running && self.running.as_ref() == Some(&request) {
            debug!("identical request already running");
            return false;
        }

        if self.pending.is_some() {
            debug!("superseding pending request");
        }
        self.pending = Some(PendingRequest {
            request,
            deadline: now + self.debounce,
        });
        if self.phase == JobState::Idle {
            self.phase = JobState::Pending;
        }
        true
    }

    /// Deadline of the pending request, if any.
    fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Moves a due pending request into the running slot.
    fn start_due(&mut self, now: Instant) -> Option<(ExpansionRequest, BlendConfig)> {
        if matches!(self.phase, JobState::Running | JobState::Cancelling) {
            return None;
        }
        if self.deadline()? > now {
            return None;
        }

        let PendingRequest { request, .. } = self.pending.take()?;
        self.phase = JobState::Running;
        self.running = Some(request.clone());
        Some((request, self.config))
    }

    fn finish_run(&mut self) {
        self.running = None;
        self.phase = if self.pending.is_some() {
            JobState::Pending
        } else {
            JobState::Idle
        };
    }

    fn cancel(&mut self) {
        self.pending = None;
        self.phase = match self.phase {
            JobState::Running | JobState::Cancelling => JobState::Cancelling,
            JobState::Idle | JobState::Pending => JobState::Idle,
        };
    }
}

struct Shared {
    inner: Mutex<Inner>,
    wake: Condvar,
    cancel: CancellationToken,
    events: EventSink,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Serializes, debounces and runs expansion requests on a worker thread.
///
/// Dropping the job cancels any run in progress and joins the worker.
pub struct ExpansionJob {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl ExpansionJob {
    /// Starts a job with [`JobOptions::default`].
    pub fn new() -> Result<Self, JobError> {
        Self::with_options(JobOptions::default())
    }

    pub fn with_options(options: JobOptions) -> Result<Self, JobError> {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner::new(options)),
            wake: Condvar::new(),
            cancel: CancellationToken::new(),
            events: EventSink::default(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("imageops-expand-worker".to_string())
            .spawn(move || worker_loop(&worker_shared))
            .map_err(JobError::WorkerSpawn)?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Registers a new receiver for every event published from now on.
    pub fn subscribe(&self) -> Receiver<JobEvent> {
        self.shared.events.subscribe()
    }

    /// Queues `request`, restarting the debounce window.
    ///
    /// Ignored while processing is disabled or when the image is empty. A
    /// request with no expansion only drops pending work. A request equal
    /// to the one currently running is a no-op; any other request made
    /// during a run is picked up once that run ends.
    pub fn request(&self, request: ExpansionRequest) {
        let wake = self.shared.lock().schedule(request, Instant::now());
        if wake {
            self.shared.wake.notify_all();
        }
    }

    /// Drops pending work and asks the current run, if any, to stop.
    pub fn cancel(&self) {
        let mut inner = self.shared.lock();
        self.shared.cancel.cancel();
        inner.cancel();
        drop(inner);
        self.shared.wake.notify_all();
    }

    pub fn state(&self) -> JobState {
        self.shared.lock().phase
    }

    /// `true` while a run is in flight, including one being cancelled.
    pub fn is_processing(&self) -> bool {
        matches!(self.state(), JobState::Running | JobState::Cancelling)
    }

    pub fn set_processing_enabled(&self, enabled: bool) {
        self.shared.lock().enabled = enabled;
    }

    pub fn is_processing_enabled(&self) -> bool {
        self.shared.lock().enabled
    }

    /// Configuration the next run will use.
    pub fn blend_config(&self) -> BlendConfig {
        self.shared.lock().config
    }

    pub fn set_blend_config(&self, config: BlendConfig) {
        self.shared.lock().config = config;
    }

    pub fn set_blend_distance(&self, distance: u32) {
        self.shared.lock().config.set_blend_distance(distance);
    }

    pub fn set_gradient_strength(&self, strength: f64) {
        self.shared.lock().config.set_gradient_strength(strength);
    }

    pub fn set_gradient_enabled(&self, enabled: bool) {
        self.shared.lock().config.set_gradient_enabled(enabled);
    }
}

impl Drop for ExpansionJob {
    fn drop(&mut self) {
        {
            let mut inner = self.shared.lock();
            inner.shutdown = true;
            inner.cancel();
            self.shared.cancel.cancel();
        }
        self.shared.wake.notify_all();

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("processing worker exited with a panic");
            }
        }
    }
}

fn worker_loop(shared: &Shared) {
    while let Some((request, config)) = next_run(shared) {
        run(shared, &request, &config);
    }
    debug!("processing worker stopped");
}

/// Blocks until a pending request is due, or returns `None` on shutdown.
fn next_run(shared: &Shared) -> Option<(ExpansionRequest, BlendConfig)> {
    let mut inner = shared.lock();
    loop {
        if inner.shutdown {
            return None;
        }

        let now = Instant::now();
        if let Some(next) = inner.start_due(now) {
            shared.cancel.reset();
            return Some(next);
        }

        inner = match inner.deadline() {
            Some(deadline) => {
                shared
                    .wake
                    .wait_timeout(inner, deadline.saturating_duration_since(now))
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
            None => shared
                .wake
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner),
        };
    }
}

fn run(shared: &Shared, request: &ExpansionRequest, config: &BlendConfig) {
    let started_at = Instant::now();
    let events = &shared.events;
    events.started();

    let progress = |percentage: u8| events.progress(percentage);
    let ctx = RunContext::new(&shared.cancel, &progress);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        expand_background(&request.image, &request.spec, config, &ctx)
    }));

    match outcome {
        Ok(Ok(image)) => {
            info!(
                "expanded {}x{} to {}x{} in {:?}",
                request.image.width(),
                request.image.height(),
                image.width(),
                image.height(),
                started_at.elapsed()
            );
            events.result(image);
        }
        Ok(Err(err)) if err.is_silent() => debug!("run ended without result: {err}"),
        Ok(Err(err)) => {
            warn!("expansion failed: {err}");
            events.error(format!("Error while processing image: {err}"));
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("expansion panicked: {message}");
            events.error(format!("Unknown error while processing image: {message}"));
        }
    }

    shared.lock().finish_run();
    events.finished();
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
