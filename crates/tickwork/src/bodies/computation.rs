//! Computation tick body
//!
//! Sums the Leibniz series for pi in fixed batches, one batch per consumed
//! frame. The frame wait itself is done by the worker's gate.

use std::sync::Arc;

use crate::config::ComputationConfig;
use crate::sink::ProgressSink;
use crate::worker::TickBody;

/// Consumer body for the computation worker
pub struct ComputationBody {
    batch_size: u64,
    iterations: u64,
    sum: f64,
    sink: Arc<dyn ProgressSink>,
}

impl std::fmt::Debug for ComputationBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputationBody")
            .field("batch_size", &self.batch_size)
            .field("iterations", &self.iterations)
            .field("sum", &self.sum)
            .finish()
    }
}

impl ComputationBody {
    pub fn new(config: &ComputationConfig, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            iterations: 0,
            sum: 0.0,
            sink,
        }
    }

    /// Terms summed so far
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Partial sum of the series
    pub fn partial_sum(&self) -> f64 {
        self.sum
    }

    /// Current pi estimate
    pub fn approximation(&self) -> f64 {
        4.0 * self.sum
    }

    fn run_batch(&mut self) {
        for _ in 0..self.batch_size {
            let term = 1.0 / (2 * self.iterations + 1) as f64;
            if self.iterations % 2 == 0 {
                self.sum += term;
            } else {
                self.sum -= term;
            }
            self.iterations += 1;
        }
    }
}

/// Progress line for `iterations` terms and estimate `approx`
pub fn progress_line(iterations: u64, approx: f64) -> String {
    format!("Iterations: {}, approx ≈ {:.10}", iterations, approx)
}

impl TickBody for ComputationBody {
    fn tick(&mut self) {
        self.run_batch();
        self.sink.emit(&progress_line(self.iterations, self.approximation()));
    }

    fn reset(&mut self) {
        self.iterations = 0;
        self.sum = 0.0;
        self.sink.emit("Computation state reset, starting Leibniz series for pi");
    }

    fn on_exit(&mut self) {
        self.sink.emit("Computation thread finished");
    }
}
