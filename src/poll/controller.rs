//! Polling controller: retry a probe on a backoff schedule until it
//! succeeds, the attempt budget runs out, or the caller stops it.
//!
//! DESIGN
//! ======
//! Each loop runs as one Tokio task. Run state (phase, attempt counter,
//! task handle) lives behind a `Mutex` that is never held across an await
//! or while user callbacks run. Every start and stop bumps a generation
//! counter; a loop only acts while its generation is still current, which
//! is checked before invoking the probe and again after it settles. A loop
//! that loses its generation exits without firing any callback.
//!
//! STATES
//! ======
//! `Idle -> Running -> Idle` with the exit recorded as an [`Outcome`]:
//! `Succeeded`, `Exhausted`, or `Cancelled`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::probe::Probe;
use super::schedule::{PollConfig, describe_delay};
use super::sleeper::{Sleeper, TokioSleeper};

/// Reported through `on_error` when the attempt budget runs out.
pub const EXHAUSTED_MESSAGE: &str = "Processing is taking longer than expected. Please check back later.";

/// First progress message of every loop.
pub const STARTING_MESSAGE: &str = "Waiting for processing to finish...";

pub type SuccessHandler<T> = Box<dyn Fn(T) + Send + Sync>;
pub type MessageHandler = Box<dyn Fn(&str) + Send + Sync>;

// =============================================================================
// RUN STATE
// =============================================================================

/// Whether a loop is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
}

/// How the most recent loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Exhausted,
    Cancelled,
}

#[derive(Default)]
struct RunState {
    phase: Phase,
    generation: u64,
    /// Failed attempts in the current (or most recent) loop.
    attempts: u32,
    outcome: Option<Outcome>,
    task: Option<JoinHandle<()>>,
}

enum AfterFailure {
    Cancelled,
    Exhausted,
    Retry(u32),
}

struct Inner<T> {
    probe: Arc<dyn Probe<Output = T>>,
    config: PollConfig,
    sleeper: Arc<dyn Sleeper>,
    on_success: SuccessHandler<T>,
    on_error: MessageHandler,
    on_progress: Option<MessageHandler>,
    run: Mutex<RunState>,
}

// =============================================================================
// BUILDER
// =============================================================================

pub struct PollerBuilder<T> {
    probe: Arc<dyn Probe<Output = T>>,
    config: PollConfig,
    sleeper: Arc<dyn Sleeper>,
    on_success: SuccessHandler<T>,
    on_error: MessageHandler,
    on_progress: Option<MessageHandler>,
}

impl<T: Send + 'static> PollerBuilder<T> {
    #[must_use]
    pub fn config(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    #[must_use]
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn build(self) -> Poller<T> {
        let mut config = self.config;
        config.max_attempts = config.max_attempts.max(1);
        Poller {
            inner: Arc::new(Inner {
                probe: self.probe,
                config,
                sleeper: self.sleeper,
                on_success: self.on_success,
                on_error: self.on_error,
                on_progress: self.on_progress,
                run: Mutex::new(RunState::default()),
            }),
        }
    }
}

// =============================================================================
// POLLER
// =============================================================================

/// Handle to one polling controller. Clones share the same loop.
pub struct Poller<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Poller<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Send + 'static> Poller<T> {
    /// Start configuring a poller. `on_success` and `on_error` are each
    /// invoked at most once per loop.
    pub fn builder<P, S, E>(probe: P, on_success: S, on_error: E) -> PollerBuilder<T>
    where
        P: Probe<Output = T> + 'static,
        S: Fn(T) + Send + Sync + 'static,
        E: Fn(&str) + Send + Sync + 'static,
    {
        PollerBuilder {
            probe: Arc::new(probe),
            config: PollConfig::default(),
            sleeper: Arc::new(TokioSleeper),
            on_success: Box::new(on_success),
            on_error: Box::new(on_error),
            on_progress: None,
        }
    }

    /// Begin a polling loop. Returns `false` without doing anything if a
    /// loop is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_polling(&self) -> bool {
        let generation = {
            let mut run = self.inner.lock_run();
            if run.phase == Phase::Running {
                debug!(generation = run.generation, "poll already running; start ignored");
                return false;
            }
            if let Some(stale) = run.task.take() {
                stale.abort();
            }
            run.generation += 1;
            run.phase = Phase::Running;
            run.attempts = 0;
            run.outcome = None;
            run.generation
        };

        info!(
            generation,
            max_attempts = self.inner.config.max_attempts,
            initial_delay_ms = u64::try_from(self.inner.config.initial_delay.as_millis()).unwrap_or(u64::MAX),
            "polling started"
        );
        self.inner.progress(STARTING_MESSAGE);

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(inner.run_loop(generation));

        let mut run = self.inner.lock_run();
        if run.generation == generation {
            if run.phase == Phase::Running {
                run.task = Some(handle);
            }
        } else {
            // Stopped from inside the progress callback.
            handle.abort();
        }
        true
    }

    /// Cancel the active loop, if any. Any scheduled or in-flight attempt
    /// is discarded without firing `on_success` or `on_error`.
    pub fn stop_polling(&self) {
        let task = {
            let mut run = self.inner.lock_run();
            run.generation += 1;
            if run.phase == Phase::Running {
                run.phase = Phase::Idle;
                run.outcome = Some(Outcome::Cancelled);
                info!(generation = run.generation, attempts = run.attempts, "polling cancelled");
            }
            run.task.take()
        };
        if let Some(task) = task {
            task.abort();
        }
        self.inner.progress("");
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.inner.lock_run().phase == Phase::Running
    }

    /// Failed attempts in the current or most recent loop.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.inner.lock_run().attempts
    }

    /// How the most recent loop ended; `None` while running or before the
    /// first loop.
    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.inner.lock_run().outcome
    }

    #[must_use]
    pub fn config(&self) -> &PollConfig {
        &self.inner.config
    }
}

// =============================================================================
// LOOP
// =============================================================================

impl<T: Send + 'static> Inner<T> {
    fn lock_run(&self) -> MutexGuard<'_, RunState> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn progress(&self, message: &str) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(message);
        }
    }

    async fn run_loop(self: Arc<Self>, generation: u64) {
        let max_attempts = self.config.max_attempts;
        let mut delay = self.config.initial_delay;

        loop {
            self.sleeper.sleep(delay).await;

            let Some(attempt) = self.begin_attempt(generation) else {
                debug!(generation, "poll cancelled before attempt");
                return;
            };
            self.progress(&format!("Checking status (attempt {attempt} of {max_attempts})..."));

            match self.probe.probe().await {
                Ok(result) => {
                    if !self.finish(generation, Outcome::Succeeded) {
                        debug!(generation, attempt, "poll cancelled during probe; result dropped");
                        return;
                    }
                    info!(generation, attempt, "poll succeeded");
                    self.progress("");
                    (self.on_success)(result);
                    return;
                }
                Err(err) => {
                    debug!(generation, attempt, error = %err, "probe not ready");
                    match self.record_failure(generation) {
                        AfterFailure::Cancelled => {
                            debug!(generation, attempt, "poll cancelled during probe");
                            return;
                        }
                        AfterFailure::Exhausted => {
                            warn!(generation, attempts = attempt, "poll attempts exhausted");
                            self.progress("");
                            (self.on_error)(EXHAUSTED_MESSAGE);
                            return;
                        }
                        AfterFailure::Retry(failed) => {
                            delay = self.config.interval.delay(failed);
                            self.progress(&format!(
                                "Not ready yet. Checking again in {} (attempt {} of {max_attempts})",
                                describe_delay(delay),
                                failed + 1
                            ));
                        }
                    }
                }
            }
        }
    }

    fn is_current(run: &RunState, generation: u64) -> bool {
        run.generation == generation && run.phase == Phase::Running
    }

    /// Number of the attempt about to run, or `None` if cancelled.
    fn begin_attempt(&self, generation: u64) -> Option<u32> {
        let run = self.lock_run();
        Self::is_current(&run, generation).then_some(run.attempts + 1)
    }

    fn record_failure(&self, generation: u64) -> AfterFailure {
        let mut run = self.lock_run();
        if !Self::is_current(&run, generation) {
            return AfterFailure::Cancelled;
        }
        run.attempts += 1;
        if run.attempts >= self.config.max_attempts {
            run.phase = Phase::Idle;
            run.outcome = Some(Outcome::Exhausted);
            run.task = None;
            AfterFailure::Exhausted
        } else {
            AfterFailure::Retry(run.attempts)
        }
    }

    /// Move to `Idle` with `outcome`. Returns `false` if the loop was
    /// cancelled or superseded.
    fn finish(&self, generation: u64, outcome: Outcome) -> bool {
        let mut run = self.lock_run();
        if !Self::is_current(&run, generation) {
            return false;
        }
        run.phase = Phase::Idle;
        run.outcome = Some(outcome);
        run.task = None;
        true
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
