//! crates/campus_vault_core/src/preview.rs
//!
//! Guests may open a resource for a short preview. When the window runs out
//! the viewer closes and a login prompt is shown instead.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long a guest may look at a resource.
pub const DEFAULT_PREVIEW: Duration = Duration::from_secs(10);

/// How long an expired window still answers status queries before it may be
/// discarded.
pub const EXPIRED_RETENTION: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// Time ran out: close the viewer and ask the guest to log in.
    Expired,
    /// The guest navigated away first.
    Cancelled,
}

/// A running preview timer. Must be created inside a tokio runtime.
pub struct PreviewWindow {
    resource_id: String,
    closes_at: Instant,
    token: CancellationToken,
    handle: JoinHandle<PreviewOutcome>,
}

impl PreviewWindow {
    pub fn open(resource_id: impl Into<String>, duration: Duration) -> Self {
        let resource_id = resource_id.into();
        let closes_at = Instant::now() + duration;
        let token = CancellationToken::new();
        let timer_token = token.clone();
        let timer_id = resource_id.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = timer_token.cancelled() => PreviewOutcome::Cancelled,
                _ = tokio::time::sleep(duration) => {
                    debug!("Preview of {} expired.", timer_id);
                    PreviewOutcome::Expired
                }
            }
        });

        Self {
            resource_id,
            closes_at,
            token,
            handle,
        }
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Whether the window has already run out (or been cancelled).
    pub fn is_closed(&self) -> bool {
        self.handle.is_finished()
    }

    /// Closed, and closed for longer than `retention`.
    pub fn is_stale(&self, retention: Duration) -> bool {
        self.is_closed() && Instant::now() >= self.closes_at + retention
    }

    /// Stops the timer. Has no effect once it has expired.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the timer to expire or be cancelled.
    pub async fn outcome(self) -> PreviewOutcome {
        self.handle.await.unwrap_or(PreviewOutcome::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn expires_after_the_window() {
        let window = PreviewWindow::open("pyq-1", DEFAULT_PREVIEW);
        assert_eq!(window.resource_id(), "pyq-1");
        assert!(!window.is_closed());
        assert_eq!(window.outcome().await, PreviewOutcome::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn navigating_away_cancels_the_timer() {
        let window = PreviewWindow::open("3", DEFAULT_PREVIEW);
        tokio::time::sleep(Duration::from_secs(4)).await;
        window.cancel();
        assert_eq!(window.outcome().await, PreviewOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_after_expiry_changes_nothing() {
        let window = PreviewWindow::open("3", Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(2)).await;
        window.cancel();
        assert_eq!(window.outcome().await, PreviewOutcome::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_windows_go_stale_only_after_retention() {
        let window = PreviewWindow::open("pyq-2", Duration::from_secs(10));
        assert!(!window.is_stale(Duration::ZERO));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(window.is_closed());
        assert!(!window.is_stale(EXPIRED_RETENTION));

        tokio::time::sleep(EXPIRED_RETENTION).await;
        assert!(window.is_stale(EXPIRED_RETENTION));
    }
}
