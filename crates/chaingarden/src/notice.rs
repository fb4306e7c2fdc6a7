//! Transient user-facing notices.
//!
//! User-initiated actions publish a short status or error line. Only the
//! most recent notice exists, and it expires on its own after a TTL. The
//! expiry is measured on the Tokio clock so paused-time tests can step
//! past it.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// Default lifetime of a notice.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(3_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Status,
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => write!(f, "status"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: Instant,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Holds the current notice, if any.
#[derive(Debug, Clone)]
pub struct Notifier {
    ttl: Duration,
    current: Option<Notice>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    /// Replaces the current notice.
    pub fn publish(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%kind, %message, "notice published");
        self.current = Some(Notice {
            kind,
            message,
            expires_at: Instant::now() + self.ttl,
        });
    }

    pub fn status(&mut self, message: impl Into<String>) {
        self.publish(NoticeKind::Status, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.publish(NoticeKind::Error, message);
    }

    /// The current notice, unless it has expired.
    pub fn current(&self) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|notice| Instant::now() < notice.expires_at)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notice_expires_after_ttl() {
        let mut notifier = Notifier::default();
        notifier.status("Wallet connected");

        tokio::time::advance(Duration::from_millis(2_999)).await;
        assert_eq!(
            notifier.current().map(|n| n.message.as_str()),
            Some("Wallet connected")
        );

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_replaces_previous_notice() {
        let mut notifier = Notifier::new(Duration::from_secs(1));
        notifier.status("Planting...");
        notifier.error("Failed to plant: slot 0 is already occupied");

        let notice = notifier.current().unwrap();
        assert!(notice.is_error());
        assert!(notice.message.starts_with("Failed to plant"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_republish_restarts_ttl() {
        let mut notifier = Notifier::new(Duration::from_secs(3));
        notifier.status("first");
        tokio::time::advance(Duration::from_secs(2)).await;
        notifier.status("second");
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(notifier.current().map(|n| n.message.as_str()), Some("second"));
    }
}
