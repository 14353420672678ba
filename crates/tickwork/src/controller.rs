//! Worker Controller
//!
//! Owns the frame signal and the three workers wired around it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::bodies::{AnimationBody, ComputationBody, MarqueeBody};
use crate::config::Config;
use crate::signal::{FrameSignal, FrameStats};
use crate::sink::{FrameRenderer, MarqueeRenderer, ProgressSink};
use crate::worker::{ControlledWorker, Worker, WorkerStatus};

/// Which worker a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Animation,
    Computation,
    Marquee,
}

impl WorkerKind {
    /// All workers in display order
    pub const ALL: [WorkerKind; 3] = [Self::Animation, Self::Computation, Self::Marquee];

    /// Get worker name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Animation => "animation",
            Self::Computation => "computation",
            Self::Marquee => "marquee",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorkerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "animation" | "anim" => Ok(Self::Animation),
            "computation" | "compute" | "comp" => Ok(Self::Computation),
            "marquee" | "text" => Ok(Self::Marquee),
            _ => Err(s.to_string()),
        }
    }
}

/// Facade over the animation, computation and marquee workers
pub struct Controller {
    signal: Arc<FrameSignal>,
    animation: Worker<AnimationBody>,
    computation: Worker<ComputationBody>,
    marquee: Worker<MarqueeBody>,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("animation", &self.animation)
            .field("computation", &self.computation)
            .field("marquee", &self.marquee)
            .field("frames", &self.signal.stats())
            .finish()
    }
}

impl Controller {
    /// Build the three workers, all stopped
    pub fn new(
        config: Config,
        frame_renderer: impl FrameRenderer + 'static,
        marquee_renderer: impl MarqueeRenderer + 'static,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let signal = Arc::new(FrameSignal::new());

        let animation = Worker::new(
            WorkerKind::Animation.name(),
            AnimationBody::new(config.animation.clone(), Arc::clone(&signal), frame_renderer),
            config.animation.delay_ms,
        );

        let computation = Worker::new(
            WorkerKind::Computation.name(),
            ComputationBody::new(&config.computation, sink),
            config.computation.delay_ms,
        )
        .gated(Arc::clone(&signal));

        let marquee = Worker::new(
            WorkerKind::Marquee.name(),
            MarqueeBody::new(&config.marquee, marquee_renderer),
            config.marquee.delay_ms,
        );

        tracing::info!("tickwork controller {} initialized", crate::VERSION);

        Self {
            signal,
            animation,
            computation,
            marquee,
        }
    }

    /// Animation (frame producer) worker
    pub fn animation(&self) -> &Worker<AnimationBody> {
        &self.animation
    }

    /// Computation (frame consumer) worker
    pub fn computation(&self) -> &Worker<ComputationBody> {
        &self.computation
    }

    /// Marquee worker
    pub fn marquee(&self) -> &Worker<MarqueeBody> {
        &self.marquee
    }

    /// Worker by kind, as a control-surface handle
    pub fn worker(&self, kind: WorkerKind) -> &dyn ControlledWorker {
        match kind {
            WorkerKind::Animation => &self.animation,
            WorkerKind::Computation => &self.computation,
            WorkerKind::Marquee => &self.marquee,
        }
    }

    /// Shared frame rendezvous
    pub fn frame_signal(&self) -> &Arc<FrameSignal> {
        &self.signal
    }

    /// Frame publish/consume counters
    pub fn frame_stats(&self) -> FrameStats {
        self.signal.stats()
    }

    /// Start every worker
    pub fn start_all(&self) {
        for kind in WorkerKind::ALL {
            self.worker(kind).start();
        }
    }

    /// Request every worker to stop
    pub fn stop_all(&self) {
        for kind in WorkerKind::ALL {
            self.worker(kind).stop();
        }
    }

    /// Status of every worker
    pub fn status(&self) -> Vec<WorkerStatus> {
        WorkerKind::ALL
            .iter()
            .map(|&kind| self.worker(kind).status())
            .collect()
    }

    /// Stop every worker and wait for their threads
    pub fn shutdown(&self) {
        // Consumer first so it is not left waiting on a stopped producer
        self.computation.shutdown();
        self.animation.shutdown();
        self.marquee.shutdown();
        tracing::info!(frames = ?self.signal.stats(), "controller shut down");
    }
}
