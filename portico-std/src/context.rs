//! Per-request cancellation and deadlines.

use portico_core::ControlError;
use std::{future::Future, time::Duration};
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;

/// Cancellation scope of a single control request.
///
/// Every service call takes a context. Engine and handler calls made on the
/// request's behalf are wrapped with [`RequestContext::run`], which abandons
/// them as soon as the token is cancelled or the deadline passes.
///
/// The deadline is fixed when the timeout is set. Every wrapped call of the
/// request shares it, so a request with several engine calls still finishes
/// within one timeout.
///
/// # Example
///
/// ```rust,ignore
/// let cx = RequestContext::new().with_timeout(Duration::from_secs(5));
/// let abort = cx.cancellation().clone();
/// // ... `abort.cancel()` from another task stops the request.
/// service.remove_inbound(&cx, RemoveInboundRequest::new("web")).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancellation: CancellationToken,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that never times out and is cancelled only through its token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `token` instead of a fresh cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// End the request `duration` from now.
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self.deadline = Some(Instant::now() + duration);
        self
    }

    /// A copy that falls back to a `duration` deadline, starting now, when
    /// no timeout is set.
    pub fn or_timeout(&self, duration: Option<Duration>) -> Self {
        match (self.deadline, duration) {
            (None, Some(duration)) => self.clone().with_timeout(duration),
            _ => self.clone(),
        }
    }

    /// The token that cancels this request.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// The timeout the deadline was derived from, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The instant past which wrapped calls fail with
    /// [`ControlError::TimedOut`].
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. Zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the request has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fails with [`ControlError::Cancelled`] if the request was cancelled.
    pub fn check(&self) -> Result<(), ControlError> {
        if self.is_cancelled() {
            Err(ControlError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Drives `fut` until it completes, the request is cancelled, or the
    /// deadline passes, whichever comes first.
    ///
    /// An already-cancelled or expired request never polls `fut`.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ControlError>
    where
        F: Future<Output = Result<T, ControlError>>,
    {
        self.check()?;
        if let (Some(deadline), Some(duration)) = (self.deadline, self.timeout) {
            if Instant::now() >= deadline {
                return Err(ControlError::TimedOut(duration));
            }
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => Err(ControlError::Cancelled),
                result = fut => result,
            }
        };

        match (self.deadline, self.timeout) {
            (Some(deadline), Some(duration)) => timeout_at(deadline, guarded)
                .await
                .unwrap_or(Err(ControlError::TimedOut(duration))),
            _ => guarded.await,
        }
    }
}
