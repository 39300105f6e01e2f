//! Outbound alert transport.
//!
//! The alert engine only knows it can hand `(recipient, subject, body)` to a
//! [`Notifier`]; how the message travels is up to the implementation.

use crate::errors::Result;
use async_trait::async_trait;
use tracing::warn;

/// Delivers an alert message.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one message. An error means it was not delivered.
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

/// Writes alerts to the log instead of sending them anywhere.
///
/// Used when no mail transport is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        warn!(%recipient, %subject, "[ALERT - not sent, no transport configured] {}", body);
        Ok(())
    }
}
