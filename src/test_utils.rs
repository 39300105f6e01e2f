//! Shared test utilities for the ledger.
//!
//! This module provides helpers for setting up in-memory databases and ledgers
//! with a controllable clock and a notifier that records what it was asked to send.

use crate::{
    config::LedgerSettings,
    core::{
        alerts::AlertEngine,
        clock::{Clock, ManualClock},
        directory::{self, NewPart},
        ledger::Ledger,
        notifier::Notifier,
    },
    entities,
    errors::Result,
    storage::Storage,
};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use sea_orm::ConnectionTrait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A message handed to [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
    /// Recipient
    pub recipient: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
}

/// Notifier that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentAlert>>,
}

impl RecordingNotifier {
    /// Messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<SentAlert> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        self.sent.lock().await.push(SentAlert {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Creates an in-memory `SQLite` store with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<Storage> {
    let storage = Storage::connect("sqlite::memory:").await?;
    storage.create_tables().await?;
    Ok(storage)
}

/// Sets up a ledger with default settings over a fresh in-memory store.
///
/// Returns the ledger, the notifier it alerts through and the clock it reads.
pub async fn setup_test_ledger() -> Result<(Ledger, Arc<RecordingNotifier>, Arc<ManualClock>)> {
    setup_test_ledger_with(LedgerSettings::default()).await
}

/// Sets up a ledger with custom policy settings.
/// The alert throttle window is the default 30 minutes.
pub async fn setup_test_ledger_with(
    settings: LedgerSettings,
) -> Result<(Ledger, Arc<RecordingNotifier>, Arc<ManualClock>)> {
    let storage = setup_test_db().await?;
    let notifier = Arc::new(RecordingNotifier::default());
    let start = Utc
        .with_ymd_and_hms(2024, 3, 1, 8, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let clock = Arc::new(ManualClock::new(start));
    let alerts = AlertEngine::new(
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::clone(&clock) as Arc<dyn Clock>,
        Duration::minutes(30),
        "stores@example.com",
    );
    Ok((Ledger::new(storage, alerts, settings), notifier, clock))
}

/// Creates a test part with the given minimum quantity.
///
/// # Defaults
/// * `description`: `"Test part"`
pub async fn create_test_part<C: ConnectionTrait>(
    db: &C,
    part_number: &str,
    min_qty: i64,
) -> Result<entities::part::Model> {
    directory::create_part(
        db,
        NewPart {
            part_number: part_number.to_string(),
            description: Some("Test part".to_string()),
            min_qty: Some(min_qty),
        },
        0,
    )
    .await
}
