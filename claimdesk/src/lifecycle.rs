//! Teardown signal for in-flight requests and timers.
//!
//! A [`Lifecycle`] is owned by whatever mounts an upload session. Every async
//! operation the session starts runs under a [`LifecycleToken`]; tearing the
//! lifecycle down (or dropping it) resolves the token, and guarded futures
//! return [`Cancelled`] instead of touching state that is gone.

use std::future::Future;
use thiserror::Error;
use tokio::sync::watch;

use crate::error::ApiError;

/// The guarded operation was abandoned by teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Operation cancelled by teardown")]
pub struct Cancelled;

impl From<Cancelled> for ApiError {
    fn from(_: Cancelled) -> Self {
        ApiError::Cancelled
    }
}

#[derive(Debug)]
pub struct Lifecycle {
    sender: watch::Sender<bool>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn token(&self) -> LifecycleToken {
        LifecycleToken { receiver: self.sender.subscribe() }
    }

    pub fn teardown(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_torn_down(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Cheap handle observing one [`Lifecycle`].
#[derive(Debug, Clone)]
pub struct LifecycleToken {
    receiver: watch::Receiver<bool>,
}

impl LifecycleToken {
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once the lifecycle is torn down or dropped.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // An Err means the sender is gone, which also counts as teardown.
        let _ = receiver.wait_for(|torn_down| *torn_down).await;
    }

    /// Run `future` unless teardown happens first.
    pub async fn guard<F: Future>(&self, future: F) -> Result<F::Output, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Cancelled),
            output = future => Ok(output),
        }
    }
}
