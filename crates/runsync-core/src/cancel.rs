//! Cooperative cancellation for in-flight remote calls.

use std::future::Future;

use tokio::sync::watch;

/// Returned by [`CancelToken::run`] when the token fired first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("canceled")]
pub struct Canceled;

/// Triggers cancellation for every token cloned from it.
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

impl CancelSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observes a [`CancelSource`].
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_canceled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Pends forever if the source
    /// is dropped without canceling.
    pub async fn canceled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Drive `fut` to completion unless cancellation arrives first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Canceled> {
        if self.is_canceled() {
            return Err(Canceled);
        }
        tokio::select! {
            biased;
            _ = self.canceled() => Err(Canceled),
            out = fut => Ok(out),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}
