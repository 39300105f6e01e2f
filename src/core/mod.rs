//! Framework-agnostic ledger logic.

/// Low-stock detection and notification throttling
pub mod alerts;
/// Injectable time source
pub mod clock;
/// Part, location and alias lookup and creation
pub mod directory;
/// Spreadsheet reconciliation into the ledger
pub mod import;
/// Quantity mutations and stock views
pub mod ledger;
/// Alert transport
pub mod notifier;

pub use alerts::{AlertEngine, AlertOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{Ledger, Movement, MovementAction, MovementRequest, ScanRequest};
pub use notifier::{LogNotifier, Notifier};
