//! Probe contract: the async check a [`Poller`](super::Poller) invokes.
//!
//! A probe resolves with a value once the awaited condition holds and
//! rejects otherwise. The controller does not distinguish retryable from
//! fatal rejections; every `Err` means "not ready yet".

use std::future::Future;

use crate::net::types::JobStatus;
use crate::net::ApiError;

/// Reasons a probe reports "not ready".
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The awaited condition has not been met yet.
    #[error("not ready: {0}")]
    NotReady(String),

    /// The remote job reported failure.
    #[error("job {id} failed with status {status}")]
    JobFailed { id: String, status: JobStatus },

    /// The underlying API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Async check invoked once per attempt.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    type Output: Send + 'static;

    /// Run one check.
    ///
    /// # Errors
    ///
    /// Any [`ProbeError`] means the condition is not met yet.
    async fn probe(&self) -> Result<Self::Output, ProbeError>;
}

/// Probe backed by a closure returning a future.
pub struct FnProbe<F> {
    f: F,
}

/// Use a closure as a probe.
pub fn probe_fn<F, Fut, T>(f: F) -> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, ProbeError>> + Send,
    T: Send + 'static,
{
    FnProbe { f }
}

#[async_trait::async_trait]
impl<F, Fut, T> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, ProbeError>> + Send,
    T: Send + 'static,
{
    type Output = T;

    async fn probe(&self) -> Result<T, ProbeError> {
        (self.f)().await
    }
}
