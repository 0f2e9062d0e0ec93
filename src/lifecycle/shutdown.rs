//! Shutdown coordination.
//!
//! The server and the config reloader each hold a [`ShutdownSignal`]; the
//! signal handler owns the [`Shutdown`] and flips it once.

use tokio::sync::watch;

/// Owner side of the stop flag.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

/// Task side of the stop flag. Resolves once stop is requested, including
/// when the request happened before the task subscribed.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Request stop. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Tasks still holding a signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Wait for stop. Also returns if the [`Shutdown`] owner is dropped.
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}
