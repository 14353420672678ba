//! Worker Engine
//!
//! One reusable start/stop/pause loop driving a pluggable tick body on a
//! dedicated thread.
//! - At most one live execution per worker
//! - Pause keeps the thread cycling but skips ticks
//! - Stop wakes the thread out of its sleep and out of a frame wait
//! - Delay and priority can change while the thread runs

mod control;
mod priority;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::signal::FrameSignal;
use control::Control;

pub use control::MIN_DELAY_MS;
pub use priority::{ParsePriorityError, Priority};

/// Per-cycle work of a worker
///
/// Any `FnMut()` closure is a tick body; richer bodies also hook reset and
/// exit.
pub trait TickBody: Send + 'static {
    /// Run one tick
    fn tick(&mut self);

    /// Return private state to its initial value (called on every start)
    fn reset(&mut self) {}

    /// Called on the worker thread right before the execution ends
    fn on_exit(&mut self) {}
}

impl<F> TickBody for F
where
    F: FnMut() + Send + 'static,
{
    fn tick(&mut self) {
        self()
    }
}

/// Lifecycle state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Never started
    Idle,
    /// Executing ticks
    Running,
    /// Alive, ticks skipped
    Paused,
    /// Stop requested or execution ended; can be started again
    Stopped,
}

impl WorkerState {
    /// Get state name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of a worker's controls and counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    pub name: String,
    pub state: WorkerState,
    pub delay: Duration,
    pub priority: Priority,
    /// Ticks executed by the current (or last) execution
    pub ticks: u64,
    /// Executions launched so far
    pub starts: u64,
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:<8} delay {}ms, priority {}, {} ticks, {} starts",
            self.name,
            self.state,
            self.delay.as_millis(),
            self.priority,
            self.ticks,
            self.starts
        )
    }
}

/// Control entry points shared by every worker, independent of its body
pub trait ControlledWorker: Send + Sync {
    fn name(&self) -> &str;
    fn start(&self);
    fn stop(&self);
    fn set_paused(&self, paused: bool);
    fn set_delay_ms(&self, delay_ms: i64);
    fn set_priority(&self, priority: Priority);
    fn is_running(&self) -> bool;
    fn is_paused(&self) -> bool;
    fn status(&self) -> WorkerStatus;
}

/// Controllable periodic task
pub struct Worker<B: TickBody> {
    /// Worker name (thread name suffix)
    name: Arc<str>,
    /// Flags shared with the execution
    control: Arc<Control>,
    /// Tick body, locked by the execution for each tick
    body: Arc<Mutex<B>>,
    /// Frame to wait for before every cycle
    gate: Option<Arc<FrameSignal>>,
    /// Current (or last) execution
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<B: TickBody> fmt::Debug for Worker<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("delay", &self.delay())
            .field("gated", &self.gate.is_some())
            .finish()
    }
}

impl<B: TickBody> Worker<B> {
    /// Create a stopped worker ticking `body` every `delay_ms`
    pub fn new(name: &str, body: B, delay_ms: u64) -> Self {
        Self {
            name: Arc::from(name),
            control: Arc::new(Control::new(delay_ms)),
            body: Arc::new(Mutex::new(body)),
            gate: None,
            handle: Mutex::new(None),
        }
    }

    /// Consume a frame from `signal` before every cycle
    ///
    /// The execution blocks until a frame is published; a stop abandons the
    /// wait and ends the execution.
    pub fn gated(mut self, signal: Arc<FrameSignal>) -> Self {
        self.gate = Some(signal);
        self
    }

    /// Get worker name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock_handle(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_body(&self) -> MutexGuard<'_, B> {
        lock_body(&self.body)
    }

    /// Launch an execution unless one is alive
    ///
    /// Resets the body, clears pause and priority, then spawns the thread.
    /// A duplicate start while the previous execution is alive (even one
    /// that is already stopping) changes nothing.
    pub fn start(&self) {
        let mut handle = self.lock_handle();

        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            tracing::debug!(worker = %self.name, "start ignored, execution still alive");
            return;
        }

        if let Some(finished) = handle.take() {
            if finished.join().is_err() {
                tracing::warn!(worker = %self.name, "previous execution panicked");
            }
        }

        self.lock_body().reset();
        self.control.prepare_launch();

        let name = Arc::clone(&self.name);
        let control = Arc::clone(&self.control);
        let body = Arc::clone(&self.body);
        let gate = self.gate.clone();

        let spawned = thread::Builder::new()
            .name(format!("tickwork-{}", self.name))
            .spawn(move || run(&name, &control, &body, gate.as_deref()));

        match spawned {
            Ok(h) => {
                *handle = Some(h);
                tracing::info!(worker = %self.name, delay_ms = self.delay().as_millis() as u64, "worker started");
            }
            Err(err) => {
                self.control.set_running(false);
                tracing::error!(worker = %self.name, error = %err, "failed to spawn worker thread");
            }
        }
    }

    /// Ask the execution to end; does not wait for it
    pub fn stop(&self) {
        let was_running = self.control.request_stop();

        if let Some(signal) = &self.gate {
            signal.wake_all();
        }
        if let Some(h) = self.lock_handle().as_ref() {
            h.thread().unpark();
        }

        if was_running {
            tracing::info!(worker = %self.name, "stop requested");
        }
    }

    /// Pause or resume ticking
    pub fn set_paused(&self, paused: bool) {
        self.control.set_paused(paused);
        tracing::debug!(worker = %self.name, paused, "pause toggled");
    }

    /// Set the delay between cycles, clamped to at least [`MIN_DELAY_MS`]
    ///
    /// A sleep already in progress keeps its old length.
    pub fn set_delay_ms(&self, delay_ms: i64) {
        self.control.set_delay_ms(delay_ms);
        tracing::debug!(worker = %self.name, delay_ms = self.delay().as_millis() as u64, "delay changed");
    }

    /// Current delay between cycles
    pub fn delay(&self) -> Duration {
        self.control.delay()
    }

    /// Hint the scheduler about the live execution; no-op when none is alive
    ///
    /// A level the OS refuses is rolled back, so the reported priority
    /// matches the thread. An execution that has not entered its loop yet
    /// applies the level on entry.
    pub fn set_priority(&self, priority: Priority) {
        if !self.is_alive() {
            tracing::trace!(worker = %self.name, %priority, "priority ignored, no live execution");
            return;
        }

        // Store before reading tid: an execution entering concurrently either
        // sees the new level or has published its tid for us to apply it
        let previous = self.control.priority();
        self.control.set_priority(priority);
        let tid = self.control.tid();
        if tid != 0 && !apply_priority(&self.name, tid, priority) {
            self.control.set_priority(previous);
        }
    }

    /// Priority level in effect for the current execution
    pub fn priority(&self) -> Priority {
        self.control.priority()
    }

    /// Running flag (set by start, cleared by stop or exit)
    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    /// Paused flag
    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    /// Whether an execution thread still exists
    pub fn is_alive(&self) -> bool {
        self.lock_handle().as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Executions currently inside their loop
    pub fn live_executions(&self) -> usize {
        self.control.live()
    }

    /// Get lifecycle state
    pub fn state(&self) -> WorkerState {
        if self.control.is_running() {
            if self.control.is_paused() {
                WorkerState::Paused
            } else {
                WorkerState::Running
            }
        } else if self.control.starts() == 0 {
            WorkerState::Idle
        } else {
            WorkerState::Stopped
        }
    }

    /// Snapshot of controls and counters
    pub fn status(&self) -> WorkerStatus {
        WorkerStatus {
            name: self.name.to_string(),
            state: self.state(),
            delay: self.delay(),
            priority: self.priority(),
            ticks: self.control.ticks(),
            starts: self.control.starts(),
        }
    }

    /// Read the tick body (waits for an in-flight tick)
    pub fn with_body<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        let body = self.lock_body();
        f(&body)
    }

    /// Poll until the execution has ended or `timeout` passes
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.is_alive() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Stop and wait for the execution to end
    pub fn shutdown(&self) {
        self.stop();

        let handle = self.lock_handle().take();
        if let Some(h) = handle {
            if h.join().is_err() {
                tracing::warn!(worker = %self.name, "execution panicked");
            }
        }
    }
}

impl<B: TickBody> Drop for Worker<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<B: TickBody> ControlledWorker for Worker<B> {
    fn name(&self) -> &str {
        Worker::name(self)
    }

    fn start(&self) {
        Worker::start(self)
    }

    fn stop(&self) {
        Worker::stop(self)
    }

    fn set_paused(&self, paused: bool) {
        Worker::set_paused(self, paused)
    }

    fn set_delay_ms(&self, delay_ms: i64) {
        Worker::set_delay_ms(self, delay_ms)
    }

    fn set_priority(&self, priority: Priority) {
        Worker::set_priority(self, priority)
    }

    fn is_running(&self) -> bool {
        Worker::is_running(self)
    }

    fn is_paused(&self) -> bool {
        Worker::is_paused(self)
    }

    fn status(&self) -> WorkerStatus {
        Worker::status(self)
    }
}

fn lock_body<B>(body: &Mutex<B>) -> MutexGuard<'_, B> {
    // A panicking tick leaves the body as the next reset will overwrite it
    body.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply_priority(name: &str, tid: i64, priority: Priority) -> bool {
    match priority::apply(tid, priority) {
        Ok(()) => {
            tracing::debug!(worker = name, %priority, "priority applied");
            true
        }
        Err(err) => {
            tracing::debug!(worker = name, %priority, error = %err, "priority refused by OS");
            false
        }
    }
}

/// Worker thread main loop
fn run<B: TickBody>(name: &str, control: &Control, body: &Mutex<B>, gate: Option<&FrameSignal>) {
    let tid = priority::current_thread_id();
    let _live = control.enter(tid);
    tracing::debug!(worker = name, "execution entered");

    // A priority set between spawn and enter was stored but not applied
    let requested = control.priority();
    if requested != Priority::Normal && !apply_priority(name, tid, requested) {
        control.set_priority(Priority::Normal);
    }

    while control.is_running() {
        if let Some(signal) = gate {
            if !signal.wait_for_frame(&control.running) {
                break;
            }
        }

        if !control.is_paused() {
            lock_body(body).tick();
            control.record_tick();
        }

        control.sleep(control.delay());
    }

    lock_body(body).on_exit();
    tracing::info!(worker = name, ticks = control.ticks(), "worker exited");
}
