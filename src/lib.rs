//! dronemap: client core for the drone-imagery platform.
//!
//! The [`poll`] module carries the one piece of real logic: a backoff
//! polling controller used to wait on server-side processing jobs.
//! [`net`] adapts the backend's data-product endpoint to that controller,
//! and [`state`] holds the client's persisted session and preferences.

pub mod config;
pub mod net;
pub mod poll;
pub mod state;
