//! Graceful shutdown signaling.
//!
//! [`ShutdownSignal`] is a thin wrapper around a `tokio::sync::watch`
//! channel: triggering flips the watched flag, and every waiter sees
//! it, including waiters that subscribe after the fact. Connection
//! draining lives in the server's accept loop, which holds a guard
//! channel per spawned connection.

use tokio::sync::watch;

/// A one-way shutdown flag shared between tasks.
///
/// Clones observe the same flag; triggering any clone wakes every
/// waiter. Once triggered the flag never resets.
///
/// # Example
///
/// ```rust
/// use almanac_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let other = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(other.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Triggers shutdown. Safe to call more than once.
    pub fn trigger(&self) {
        // Every clone holds a receiver, so the send cannot fail.
        let _ = self.tx.send(true);
    }

    /// Returns `true` if shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until shutdown is triggered.
    ///
    /// Returns immediately if it already has been.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        // The sender lives in self, so wait_for cannot observe a
        // closed channel here.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Creates a signal wired to SIGTERM and SIGINT.
    ///
    /// # Panics
    ///
    /// Panics if signal handlers cannot be registered.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });

        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for SIGTERM or SIGINT (Ctrl+C only off Unix).
async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT handler");

        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        tracing::info!("Received {}, initiating graceful shutdown", name);
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Ctrl+C handler");
        tracing::info!("Received Ctrl+C, initiating graceful shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_starts_untriggered() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
    }

    #[tokio::test]
    async fn test_trigger_is_idempotent() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        signal.trigger();
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn test_clones_share_the_flag() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();

        clone.trigger();

        assert!(signal.is_shutdown());
        assert!(clone.is_shutdown());
    }

    #[tokio::test]
    async fn test_wait_wakes_on_trigger() {
        let signal = ShutdownSignal::new();
        let remote = signal.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            remote.trigger();
        });

        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .expect("wait should complete");
    }

    #[tokio::test]
    async fn test_wait_after_trigger_returns_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        tokio::time::timeout(Duration::from_millis(10), signal.wait())
            .await
            .expect("wait should not block");
    }

    #[tokio::test]
    async fn test_late_clone_sees_earlier_trigger() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        let late = signal.clone();
        assert!(late.is_shutdown());
        tokio::time::timeout(Duration::from_millis(10), late.wait())
            .await
            .expect("wait should not block");
    }
}
