//! tickwork
//!
//! Controllable periodic workers sharing a one-slot frame rendezvous.
//!
//! # Workers
//! - Animation: advances a particle simulation and publishes a frame per tick
//! - Computation: consumes published frames and sums a series batch per frame
//! - Marquee: scrolls a text offset on its own clock
//!
//! Each worker runs on its own thread and can be started, stopped, paused,
//! re-timed and re-prioritized at runtime from any thread.
//!
//! # Example
//! ```rust,ignore
//! use tickwork::{Config, Controller, NullRenderer, ProgressLog, WorkerKind};
//! use std::sync::Arc;
//!
//! let log = Arc::new(ProgressLog::new(8000));
//! let controller = Controller::new(Config::default(), NullRenderer, NullRenderer, log.clone());
//! controller.worker(WorkerKind::Animation).start();
//! controller.worker(WorkerKind::Computation).start();
//! ```

mod config;
mod controller;
mod error;
mod signal;
mod sink;
pub mod bodies;
pub mod worker;

pub use bodies::{AnimationBody, ComputationBody, FrameView, MarqueeBody, Particle};
pub use config::{AnimationConfig, ComputationConfig, Config, MarqueeConfig};
pub use controller::{Controller, WorkerKind};
pub use error::ConfigError;
pub use signal::{FrameSignal, FrameStats};
pub use sink::{FrameRenderer, MarqueeRenderer, NullRenderer, ProgressLog, ProgressSink};
pub use worker::{ControlledWorker, Priority, TickBody, Worker, WorkerState, WorkerStatus};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
