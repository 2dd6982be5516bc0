use log::{info, warn};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
    Success,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusKind::Info => "info",
            StatusKind::Error => "error",
            StatusKind::Success => "success",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub created_at: Instant,
}

/// Holds at most one user-facing status message, which disappears on its
/// own once the display duration has passed.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    display_for: Duration,
    current: Option<StatusMessage>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}

impl NotificationCenter {
    pub fn new(display_for: Duration) -> Self {
        Self {
            display_for,
            current: None,
        }
    }

    /// Replace whatever is showing with a new message
    pub fn show(&mut self, text: impl Into<String>, kind: StatusKind) {
        let text = text.into();
        match kind {
            StatusKind::Error => warn!("status [{}]: {}", kind, text),
            _ => info!("status [{}]: {}", kind, text),
        }
        self.current = Some(StatusMessage {
            text,
            kind,
            created_at: Instant::now(),
        });
    }

    /// The active message, if it has not expired yet
    pub fn current(&self) -> Option<&StatusMessage> {
        self.current
            .as_ref()
            .filter(|message| message.created_at.elapsed() < self.display_for)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_message_expires_after_display_duration() {
        let mut center = NotificationCenter::default();
        center.show("Recipe saved!", StatusKind::Success);
        assert_eq!(center.current().unwrap().text, "Recipe saved!");

        advance(Duration::from_millis(2999)).await;
        assert!(center.current().is_some());

        advance(Duration::from_millis(1)).await;
        assert!(center.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_message_replaces_older() {
        let mut center = NotificationCenter::default();
        center.show("first", StatusKind::Info);
        advance(Duration::from_millis(2000)).await;
        center.show("second", StatusKind::Error);

        advance(Duration::from_millis(2000)).await;
        let current = center.current().unwrap();
        assert_eq!(current.text, "second");
        assert_eq!(current.kind, StatusKind::Error);
    }

    #[test]
    fn test_dismiss() {
        let mut center = NotificationCenter::new(Duration::from_secs(60));
        center.show("hello", StatusKind::Info);
        center.dismiss();
        assert!(center.current().is_none());
    }
}
