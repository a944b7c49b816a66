//! Time management utilities

use std::time::{Duration, Instant};

/// Fixed time-step accumulator
///
/// Wall-clock time is fed in with [`FixedStep::accumulate`]; whole steps are
/// drained with [`FixedStep::next_step`]. The remainder carries over to the
/// next frame and is exposed as an interpolation factor.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
    taken: u32,
    total_steps: u64,
}

impl FixedStep {
    /// Create an accumulator for steps of `step` seconds, draining at most
    /// `max_steps` per frame
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
            taken: 0,
            total_steps: 0,
        }
    }

    /// Add elapsed wall-clock time and start a new frame
    pub fn accumulate(&mut self, elapsed: f32) {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }
        self.taken = 0;
    }

    /// Take one step if enough time has accumulated
    ///
    /// Once `max_steps` have been taken this frame the backlog is dropped so a
    /// long stall does not turn into a spiral of catch-up frames.
    pub fn next_step(&mut self) -> bool {
        if self.taken >= self.max_steps {
            if self.accumulator >= self.step {
                log::warn!(
                    "Dropping {:.4}s of simulation backlog after {} steps",
                    self.accumulator - self.accumulator % self.step,
                    self.taken
                );
                self.accumulator %= self.step;
            }
            return false;
        }

        if self.accumulator >= self.step {
            self.accumulator -= self.step;
            self.taken += 1;
            self.total_steps += 1;
            true
        } else {
            false
        }
    }

    /// Fraction of a step left in the accumulator, in `[0, 1)`
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    /// The fixed step length in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Steps taken since creation
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let running = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + running
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }
}
