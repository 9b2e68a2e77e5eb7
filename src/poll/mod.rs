//! Poll: retry an async probe on a backoff schedule.
//!
//! DESIGN
//! ======
//! [`Poller`] is an explicit `Idle -> Running -> Idle` state machine.
//! Anything that touches time or I/O is injected, so tests drive the loop
//! on a paused Tokio clock.

pub mod controller;
pub mod probe;
pub mod schedule;
pub mod sleeper;

pub use controller::{EXHAUSTED_MESSAGE, Outcome, Phase, Poller, PollerBuilder, STARTING_MESSAGE};
pub use probe::{FnProbe, Probe, ProbeError, probe_fn};
pub use schedule::{Interval, PollConfig, tiered_delay};
pub use sleeper::{Sleeper, TokioSleeper};
