//! Low-stock alert engine.
//!
//! Invoked after every committed outbound movement with the part's total before
//! and after. An alert fires only on a downward crossing of the part's minimum
//! (`before > min && after <= min`) and at most once per throttle window per
//! part. A minimum of 0 turns monitoring off for that part.
//!
//! Throttle state lives in memory and is lost on restart.

use crate::core::clock::Clock;
use crate::core::notifier::Notifier;
use crate::entities::part;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What the engine did for one outbound movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertOutcome {
    /// The part has no minimum configured
    NotMonitored,
    /// The movement did not cross the minimum downwards
    NoCrossing,
    /// A crossing happened but an alert was sent too recently
    Throttled,
    /// A notification was handed to the notifier
    Sent,
    /// The notifier returned an error; the throttle slot was released
    DispatchFailed,
}

/// Last alert sent for one part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleState {
    /// When it was sent
    pub sent_at: DateTime<Utc>,
    /// Total quantity it reported
    pub total_qty: i64,
}

/// Decides whether `before -> after` is an alertable crossing of `min_qty`.
#[must_use]
pub const fn is_downward_crossing(min_qty: i64, total_before: i64, total_after: i64) -> bool {
    min_qty > 0 && total_before > min_qty && total_after <= min_qty
}

/// Threshold detection plus per-part notification throttling.
pub struct AlertEngine {
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    window: Duration,
    recipient: String,
    throttle: Mutex<HashMap<i64, ThrottleState>>,
}

impl std::fmt::Debug for AlertEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertEngine")
            .field("window", &self.window)
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

impl AlertEngine {
    /// Builds an engine sending to `recipient` at most once per `window` per part.
    pub fn new(
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        window: Duration,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            notifier,
            clock,
            window,
            recipient: recipient.into(),
            throttle: Mutex::new(HashMap::new()),
        }
    }

    /// The clock this engine reads.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Last alert recorded for `part_id`, if any.
    pub async fn last_alert(&self, part_id: i64) -> Option<ThrottleState> {
        self.throttle.lock().await.get(&part_id).copied()
    }

    /// Handles one committed outbound movement of `part`.
    pub async fn on_outbound(
        &self,
        part: &part::Model,
        total_before: i64,
        total_after: i64,
    ) -> AlertOutcome {
        if part.min_qty <= 0 {
            return AlertOutcome::NotMonitored;
        }
        if !is_downward_crossing(part.min_qty, total_before, total_after) {
            return AlertOutcome::NoCrossing;
        }

        let now = self.clock.now();
        // Reserve the slot before dispatching so concurrent crossings cannot both send
        let previous = {
            let mut throttle = self.throttle.lock().await;
            let previous = throttle.get(&part.id).copied();
            if let Some(last) = previous {
                if now - last.sent_at < self.window {
                    debug!(
                        part_number = %part.part_number,
                        last_sent = %last.sent_at,
                        "Low-stock alert suppressed by throttle"
                    );
                    return AlertOutcome::Throttled;
                }
            }
            throttle.insert(
                part.id,
                ThrottleState {
                    sent_at: now,
                    total_qty: total_after,
                },
            );
            previous
        };

        let (subject, body) = alert_message(part, total_after);
        match self.notifier.notify(&self.recipient, &subject, &body).await {
            Ok(()) => {
                info!(
                    part_number = %part.part_number,
                    total = total_after,
                    min = part.min_qty,
                    "Low-stock alert sent"
                );
                AlertOutcome::Sent
            }
            Err(e) => {
                warn!(part_number = %part.part_number, "Failed to send low-stock alert: {}", e);
                let mut throttle = self.throttle.lock().await;
                match previous {
                    Some(prev) => throttle.insert(part.id, prev),
                    None => throttle.remove(&part.id),
                };
                AlertOutcome::DispatchFailed
            }
        }
    }
}

/// Subject and body of a low-stock alert.
#[must_use]
pub fn alert_message(part: &part::Model, total_qty: i64) -> (String, String) {
    let subject = format!("Low stock: {}", part.part_number);
    let body = format!(
        "Part {} ({}) now has a total quantity of {}, at or below its minimum of {}.",
        part.part_number, part.description, total_qty, part.min_qty
    );
    (subject, body)
}
