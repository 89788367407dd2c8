//! Cooperative cancellation for store operations

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{Result, StoreError};

/// A cancellation signal shared between a caller and the operations it issues
///
/// Clones observe the same signal. Cancelling only abandons the wait on a
/// pending operation; it never interrupts a cipher computation in progress.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Signal cancellation to every holder of this token
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation has been signalled
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancellation has been signalled
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so `wait_for` cannot fail here
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Fail fast if already cancelled
    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(StoreError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Await `operation` unless cancellation arrives first
    ///
    /// A result that is already available wins over a concurrent cancel.
    pub(crate) async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::pin!(operation);
        tokio::select! {
            biased;
            result = &mut operation => result,
            _ = self.cancelled() => Err(StoreError::Cancelled),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
