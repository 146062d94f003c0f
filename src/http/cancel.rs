use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{ClientError, ClientResult};

/// Cooperative cancellation signal passed through every async API call.
///
/// Clones share the same signal. Once cancelled a token stays cancelled; a
/// fresh token is needed for the next batch of work.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once `cancel` has been called on any clone
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        while !*receiver.borrow_and_update() {
            // The sender lives as long as self, so this cannot close early
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Returns a guard that cancels the token when dropped. Owners hold the
    /// guard for as long as they want responses; teardown drops it.
    pub fn guard(&self) -> CancelGuard {
        CancelGuard {
            token: self.clone(),
        }
    }

    /// Run `work` unless the token fires first. A result that arrives after
    /// cancellation is discarded.
    pub async fn run<F, T>(&self, work: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ClientError::Cancelled),
            result = work => {
                if self.is_cancelled() {
                    tracing::debug!("discarding response that arrived after cancellation");
                    Err(ClientError::Cancelled)
                } else {
                    result
                }
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CancelGuard {
    token: CancelToken,
}

impl CancelGuard {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
