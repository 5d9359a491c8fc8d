//! Per-call execution context.
//!
//! A [`Context`] travels with every repository call and bounds the storage
//! work done on its behalf. It can carry a deadline, a cancellation signal,
//! or both. Storage futures are raced against them in [`Context::run`];
//! when the context wins, the storage future is dropped, which aborts the
//! round trip (and rolls back any open transaction).

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{AppError, AppResult};

/// Deadline and cancellation carrier for one logical operation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`Context`] derived from the same [`Context::with_cancel`] call.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context with no deadline that is never cancelled.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_in(timeout)
    }

    /// Returns a copy of this context that expires `timeout` from now,
    /// or at the existing deadline if that is sooner.
    #[must_use]
    pub fn deadline_in(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        });
        self
    }

    /// Returns a cancellable copy of this context together with its handle.
    #[must_use]
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    /// The deadline, if one is set.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Fails fast if the context is already cancelled or expired.
    pub fn check(&self) -> AppResult<()> {
        if self.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(AppError::Timeout);
        }
        Ok(())
    }

    /// Runs a storage future under this context.
    ///
    /// Returns `Cancelled` or `Timeout` if the context fires first; the
    /// future is dropped in that case.
    pub async fn run<F, T>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.check()?;

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    let signalled = rx.wait_for(|c| *c).await.map(|_| ());
                    if signalled.is_err() {
                        // Handle dropped without cancelling.
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(AppError::Cancelled),
            () = expired => Err(AppError::Timeout),
            result = fut => result,
        }
    }
}
