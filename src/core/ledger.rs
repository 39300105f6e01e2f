//! Stock ledger - the quantity-mutation core.
//!
//! Every movement resolves the part and its target location, changes exactly
//! one stock entry and appends one transaction row, all inside a single
//! database transaction. Decrements are a conditional update
//! (`qty = qty - n WHERE qty >= n`) so two concurrent outbound scans cannot both
//! pass the stock check. Outbound movements are handed to the alert engine once
//! committed; inbound movements and `set` corrections never are.
//!
//! Quantities are never cached: every read goes to the backend.

use crate::{
    config::{AppConfig, LedgerSettings},
    core::{
        alerts::{AlertEngine, AlertOutcome},
        clock::{Clock, SystemClock},
        directory,
        notifier::Notifier,
    },
    entities::{StockEntry, Transaction, location, part, stock_entry, transaction},
    errors::{Error, Result},
    storage::Storage,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::{Expr, OnConflict},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Direction of a recorded movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementAction {
    /// Stock received at a location
    In,
    /// Stock taken from a location
    Out,
    /// Administrative correction to an exact quantity
    Set,
}

impl MovementAction {
    /// Value stored in the `action` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Set => "set",
        }
    }
}

impl fmt::Display for MovementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "set" => Ok(Self::Set),
            other => Err(Error::validation(format!(
                "action must be \"in\" or \"out\", got \"{other}\""
            ))),
        }
    }
}

/// An inbound or outbound movement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRequest {
    /// Part number or alias barcode
    pub part_number: String,
    /// Location barcode; may be omitted for parts with a fixed location
    pub location_barcode: Option<String>,
    /// Units to move; must be positive
    pub quantity: i64,
    /// Acting operator
    pub user: Option<String>,
}

impl MovementRequest {
    /// Builds a request without an acting user.
    pub fn new(part_number: &str, location_barcode: Option<&str>, quantity: i64) -> Self {
        Self {
            part_number: part_number.to_string(),
            location_barcode: location_barcode.map(str::to_string),
            quantity,
            user: None,
        }
    }

    /// Attributes the movement to `user`.
    #[must_use]
    pub fn by(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }
}

/// A scan as received from a handheld or the web UI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScanRequest {
    /// Part number or alias barcode
    pub part_number: String,
    /// Location barcode
    #[serde(default)]
    pub location_barcode: Option<String>,
    /// Units to move
    pub quantity: i64,
    /// `in` or `out`
    pub action: MovementAction,
    /// Acting operator
    #[serde(default)]
    pub user: Option<String>,
}

/// A committed movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movement {
    /// The appended transaction row
    pub transaction: transaction::Model,
    /// The part after the movement (including any fixed-location assignment)
    pub part: part::Model,
    /// Where the movement happened
    pub location: location::Model,
    /// Direction of the movement
    pub action: MovementAction,
    /// Magnitude of the movement
    pub quantity: i64,
    /// Quantity at the location after the movement
    pub qty_at_location: i64,
    /// Part total across all locations before the movement
    pub total_before: i64,
    /// Part total across all locations after the movement
    pub total_after: i64,
    /// The location became the part's fixed location with this movement
    pub fixed_location_assigned: bool,
    /// The location was created implicitly by this movement
    pub location_created: bool,
    /// Alert engine decision; only present for outbound movements
    pub alert: Option<AlertOutcome>,
}

/// Quantity of a part at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationQty {
    /// Location id
    pub location_id: i64,
    /// Location display name
    pub location_name: String,
    /// Location barcode
    pub barcode: String,
    /// Quantity held there
    pub qty: i64,
}

/// A part with its stock broken down by location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartStock {
    /// The part
    pub part: part::Model,
    /// Sum over all locations
    pub total: i64,
    /// Per-location quantities, ordered by location name
    pub locations: Vec<LocationQty>,
}

/// Quantity of one part held at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartQty {
    /// Part id
    pub part_id: i64,
    /// Part number
    pub part_number: String,
    /// Part description
    pub description: String,
    /// Quantity held
    pub qty: i64,
}

/// Everything stored at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationStock {
    /// The location
    pub location: location::Model,
    /// Parts held, ordered by part number
    pub parts: Vec<PartQty>,
}

/// Result of comparing stored stock with a replay of the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockCheck {
    /// Part checked
    pub part_id: i64,
    /// Stored non-zero quantities by location id
    pub stored: BTreeMap<i64, i64>,
    /// Replayed non-zero quantities by location id
    pub replayed: BTreeMap<i64, i64>,
    /// Stored total across locations
    pub total: i64,
}

impl StockCheck {
    /// True when the stored entries match the replayed log and nothing is negative.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.stored == self.replayed
            && checked_total(self.stored.values().copied()).ok() == Some(self.total)
            && self.stored.values().all(|q| *q >= 0)
    }
}

/// Largest quantity a single movement, correction or stock entry may hold.
///
/// Keeps per-part totals far away from `i64` overflow.
pub const MAX_QUANTITY: i64 = 2_147_483_647;

/// Rejects zero, negative and otherwise unusable movement quantities.
pub fn check_quantity(quantity: i64) -> Result<i64> {
    if quantity <= 0 {
        return Err(Error::validation(format!(
            "quantity must be a positive integer, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(Error::validation(format!(
            "quantity must be at most {MAX_QUANTITY}, got {quantity}"
        )));
    }
    Ok(quantity)
}

/// Sums quantities, failing instead of wrapping on overflow.
pub fn checked_total<I: IntoIterator<Item = i64>>(quantities: I) -> Result<i64> {
    quantities
        .into_iter()
        .try_fold(0_i64, i64::checked_add)
        .ok_or_else(|| Error::validation("stock total exceeds the representable range"))
}

/// Parses user-entered text as a movement quantity.
pub fn parse_quantity(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("quantity is required"));
    }
    let quantity = trimmed.parse::<i64>().map_err(|_| {
        Error::validation(format!(
            "quantity must be a positive integer, got \"{trimmed}\""
        ))
    })?;
    check_quantity(quantity)
}

/// Rebuilds per-location quantities from transactions in commit order.
pub fn replay_transactions(transactions: &[transaction::Model]) -> Result<BTreeMap<i64, i64>> {
    let mut quantities = BTreeMap::new();
    for tx in transactions {
        let action: MovementAction = tx.action.parse().map_err(|_| {
            Error::Database(DbErr::Custom(format!(
                "transaction {} has unknown action \"{}\"",
                tx.id, tx.action
            )))
        })?;
        let qty = quantities.entry(tx.location_id).or_insert(0_i64);
        match action {
            MovementAction::In => *qty += tx.qty,
            MovementAction::Out => *qty -= tx.qty,
            MovementAction::Set => *qty = tx.qty_after,
        }
    }
    quantities.retain(|_, qty| *qty != 0);
    Ok(quantities)
}

async fn ensure_stock_entry<C: ConnectionTrait>(db: &C, part_id: i64, location_id: i64) -> Result<()> {
    let entry = stock_entry::ActiveModel {
        part_id: Set(part_id),
        location_id: Set(location_id),
        qty: Set(0),
        ..Default::default()
    };
    StockEntry::insert(entry)
        .on_conflict(
            OnConflict::columns([stock_entry::Column::PartId, stock_entry::Column::LocationId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn qty_at<C: ConnectionTrait>(db: &C, part_id: i64, location_id: i64) -> Result<i64> {
    Ok(StockEntry::find()
        .filter(stock_entry::Column::PartId.eq(part_id))
        .filter(stock_entry::Column::LocationId.eq(location_id))
        .one(db)
        .await?
        .map_or(0, |entry| entry.qty))
}

async fn total_for_part<C: ConnectionTrait>(db: &C, part_id: i64) -> Result<i64> {
    // Summed here rather than with SUM() so both backends decode the same type
    let quantities: Vec<i64> = StockEntry::find()
        .select_only()
        .column(stock_entry::Column::Qty)
        .filter(stock_entry::Column::PartId.eq(part_id))
        .into_tuple()
        .all(db)
        .await?;
    checked_total(quantities)
}

/// Stock ledger over a [`Storage`] backend.
pub struct Ledger {
    storage: Storage,
    alerts: AlertEngine,
    clock: Arc<dyn Clock>,
    settings: LedgerSettings,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("storage", &self.storage)
            .field("alerts", &self.alerts)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Builds a ledger. Transaction timestamps use the alert engine's clock.
    #[must_use]
    pub fn new(storage: Storage, alerts: AlertEngine, settings: LedgerSettings) -> Self {
        let clock = alerts.clock();
        Self {
            storage,
            alerts,
            clock,
            settings,
        }
    }

    /// Builds a ledger from application configuration with the wall clock.
    #[must_use]
    pub fn from_config(storage: Storage, config: &AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        let alerts = AlertEngine::new(
            notifier,
            Arc::new(SystemClock),
            config.alerts.throttle_window(),
            config.alerts.recipient.clone(),
        );
        Self::new(storage, alerts, config.ledger.clone())
    }

    /// Backend this ledger writes to.
    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Alert engine fed by outbound movements.
    #[must_use]
    pub const fn alerts(&self) -> &AlertEngine {
        &self.alerts
    }

    /// Active ledger policy.
    #[must_use]
    pub const fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Dispatches a scan to [`Ledger::scan_in`] or [`Ledger::scan_out`].
    pub async fn scan(&self, request: ScanRequest) -> Result<Movement> {
        let movement = MovementRequest {
            part_number: request.part_number,
            location_barcode: request.location_barcode,
            quantity: request.quantity,
            user: request.user,
        };
        match request.action {
            MovementAction::In => self.scan_in(movement).await,
            MovementAction::Out => self.scan_out(movement).await,
            MovementAction::Set => Err(Error::validation(
                "action must be \"in\" or \"out\"; use set_quantity for corrections",
            )),
        }
    }

    /// Picks the location an in/out movement applies to.
    ///
    /// Returns the location, whether it was created, and whether it should
    /// become the part's fixed location.
    async fn target_location<C: ConnectionTrait>(
        &self,
        db: &C,
        part: &part::Model,
        requested: Option<&str>,
        action: MovementAction,
    ) -> Result<(location::Model, bool, bool)> {
        let requested = requested.map(str::trim).filter(|b| !b.is_empty());
        match (part.fixed_location_id, requested) {
            (Some(fixed_id), requested) => {
                let fixed = directory::find_location_by_id(db, fixed_id)
                    .await?
                    .ok_or_else(|| Error::not_found("location", fixed_id.to_string()))?;
                if let Some(barcode) = requested {
                    if barcode != fixed.barcode {
                        return Err(Error::FixedLocationConflict {
                            part_number: part.part_number.clone(),
                            fixed_location: fixed.barcode,
                            requested_location: barcode.to_string(),
                        });
                    }
                }
                Ok((fixed, false, false))
            }
            (None, Some(barcode)) => {
                let (location, created) = if self.settings.scan_creates_locations {
                    directory::get_or_create_location(db, barcode).await?
                } else {
                    (directory::require_location(db, barcode).await?, false)
                };
                let assign =
                    action == MovementAction::In && self.settings.auto_assign_fixed_location;
                Ok((location, created, assign))
            }
            (None, None) => Err(Error::validation(format!(
                "location_barcode is required: part {} has no fixed location",
                part.part_number
            ))),
        }
    }

    /// Receives `quantity` units of a part at a location.
    pub async fn scan_in(&self, request: MovementRequest) -> Result<Movement> {
        let quantity = check_quantity(request.quantity)?;
        let txn = self.storage.connection().begin().await?;

        let mut part = directory::resolve_part(&txn, &request.part_number).await?;
        let (location, location_created, mut assign) = self
            .target_location(
                &txn,
                &part,
                request.location_barcode.as_deref(),
                MovementAction::In,
            )
            .await?;
        if assign {
            (part, assign) = directory::claim_fixed_location(&txn, &part, &location).await?;
        }

        let total_before = total_for_part(&txn, part.id).await?;
        ensure_stock_entry(&txn, part.id, location.id).await?;
        let incremented = StockEntry::update_many()
            .col_expr(
                stock_entry::Column::Qty,
                Expr::col(stock_entry::Column::Qty).add(quantity),
            )
            .filter(stock_entry::Column::PartId.eq(part.id))
            .filter(stock_entry::Column::LocationId.eq(location.id))
            .filter(stock_entry::Column::Qty.lte(MAX_QUANTITY - quantity))
            .exec(&txn)
            .await?;
        if incremented.rows_affected == 0 {
            return Err(Error::validation(format!(
                "receiving {quantity} of {} at {} would exceed {MAX_QUANTITY}",
                part.part_number, location.barcode
            )));
        }
        let qty_at_location = qty_at(&txn, part.id, location.id).await?;

        let transaction = self
            .record(
                &txn,
                &part,
                &location,
                MovementAction::In,
                quantity,
                qty_at_location,
                request.user,
            )
            .await?;
        let total_after = total_for_part(&txn, part.id).await?;
        txn.commit().await?;

        info!(
            part_number = %part.part_number,
            location = %location.barcode,
            quantity,
            total = total_after,
            "Stock in"
        );
        Ok(Movement {
            transaction,
            part,
            location,
            action: MovementAction::In,
            quantity,
            qty_at_location,
            total_before,
            total_after,
            fixed_location_assigned: assign,
            location_created,
            alert: None,
        })
    }

    /// Takes `quantity` units of a part from a location.
    ///
    /// Fails with [`Error::InsufficientStock`] and changes nothing if the
    /// location holds fewer than `quantity` units.
    pub async fn scan_out(&self, request: MovementRequest) -> Result<Movement> {
        let quantity = check_quantity(request.quantity)?;
        let txn = self.storage.connection().begin().await?;

        let part = directory::resolve_part(&txn, &request.part_number).await?;
        let (location, location_created, _) = self
            .target_location(
                &txn,
                &part,
                request.location_barcode.as_deref(),
                MovementAction::Out,
            )
            .await?;

        let total_before = total_for_part(&txn, part.id).await?;
        let decremented = StockEntry::update_many()
            .col_expr(
                stock_entry::Column::Qty,
                Expr::col(stock_entry::Column::Qty).sub(quantity),
            )
            .filter(stock_entry::Column::PartId.eq(part.id))
            .filter(stock_entry::Column::LocationId.eq(location.id))
            .filter(stock_entry::Column::Qty.gte(quantity))
            .exec(&txn)
            .await?;
        if decremented.rows_affected == 0 {
            let available = qty_at(&txn, part.id, location.id).await?;
            debug!(
                part_number = %part.part_number,
                location = %location.barcode,
                available,
                requested = quantity,
                "Rejected outbound movement"
            );
            return Err(Error::InsufficientStock {
                part_number: part.part_number,
                location: location.barcode,
                available,
                requested: quantity,
            });
        }
        let qty_at_location = qty_at(&txn, part.id, location.id).await?;

        let transaction = self
            .record(
                &txn,
                &part,
                &location,
                MovementAction::Out,
                quantity,
                qty_at_location,
                request.user,
            )
            .await?;
        let total_after = total_for_part(&txn, part.id).await?;
        txn.commit().await?;

        info!(
            part_number = %part.part_number,
            location = %location.barcode,
            quantity,
            total = total_after,
            "Stock out"
        );
        let alert = self
            .alerts
            .on_outbound(&part, total_before, total_after)
            .await;

        Ok(Movement {
            transaction,
            part,
            location,
            action: MovementAction::Out,
            quantity,
            qty_at_location,
            total_before,
            total_after,
            fixed_location_assigned: false,
            location_created,
            alert: Some(alert),
        })
    }

    /// Sets the stock of a part at a location to exactly `quantity`.
    ///
    /// This is a correction, not a physical movement: it ignores the part's
    /// fixed location and never reaches the alert engine. The appended `set`
    /// transaction records the size of the change.
    pub async fn set_quantity(
        &self,
        part_number: &str,
        location_barcode: &str,
        quantity: i64,
        user: Option<&str>,
    ) -> Result<Movement> {
        let txn = self.storage.connection().begin().await?;
        let movement = self
            .set_quantity_within(&txn, part_number, location_barcode, quantity, user)
            .await?;
        txn.commit().await?;

        info!(
            part_number = %movement.part.part_number,
            location = %movement.location.barcode,
            change = movement.quantity,
            after = quantity,
            "Stock corrected"
        );
        Ok(movement)
    }

    /// [`Ledger::set_quantity`] inside a database transaction owned by the caller.
    pub(crate) async fn set_quantity_within<C: ConnectionTrait>(
        &self,
        db: &C,
        part_number: &str,
        location_barcode: &str,
        quantity: i64,
        user: Option<&str>,
    ) -> Result<Movement> {
        if !(0..=MAX_QUANTITY).contains(&quantity) {
            return Err(Error::validation(format!(
                "quantity must be between 0 and {MAX_QUANTITY}, got {quantity}"
            )));
        }
        let part = directory::resolve_part(db, part_number).await?;
        let location = directory::require_location(db, location_barcode).await?;

        let total_before = total_for_part(db, part.id).await?;
        ensure_stock_entry(db, part.id, location.id).await?;
        let before = qty_at(db, part.id, location.id).await?;
        StockEntry::update_many()
            .col_expr(stock_entry::Column::Qty, Expr::value(quantity))
            .filter(stock_entry::Column::PartId.eq(part.id))
            .filter(stock_entry::Column::LocationId.eq(location.id))
            .exec(db)
            .await?;

        let delta = (quantity - before).abs();
        let transaction = self
            .record(
                db,
                &part,
                &location,
                MovementAction::Set,
                delta,
                quantity,
                user.map(str::to_string),
            )
            .await?;
        let total_after = total_for_part(db, part.id).await?;

        Ok(Movement {
            transaction,
            part,
            location,
            action: MovementAction::Set,
            quantity: delta,
            qty_at_location: quantity,
            total_before,
            total_after,
            fixed_location_assigned: false,
            location_created: false,
            alert: None,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn record<C: ConnectionTrait>(
        &self,
        db: &C,
        part: &part::Model,
        location: &location::Model,
        action: MovementAction,
        quantity: i64,
        qty_after: i64,
        user: Option<String>,
    ) -> Result<transaction::Model> {
        transaction::ActiveModel {
            part_id: Set(part.id),
            location_id: Set(location.id),
            qty: Set(quantity),
            action: Set(action.as_str().to_string()),
            qty_after: Set(qty_after),
            user_name: Set(user),
            created_at: Set(self.now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(Into::into)
    }

    /// Total quantity of a part across all locations; 0 when it has no stock.
    pub async fn total_quantity(&self, part_id: i64) -> Result<i64> {
        total_for_part(self.storage.connection(), part_id).await
    }

    /// A part's stock broken down by location.
    pub async fn stock_for_part(&self, part_number: &str) -> Result<PartStock> {
        let part = directory::resolve_part(self.storage.connection(), part_number).await?;
        let rows = self
            .storage
            .all(
                "SELECT l.id AS location_id, l.name AS location_name, l.barcode AS barcode, s.qty AS qty \
                 FROM stock_entries s JOIN locations l ON s.location_id = l.id \
                 WHERE s.part_id = ? ORDER BY l.name",
                vec![part.id.into()],
            )
            .await?;
        let locations = rows
            .iter()
            .map(|row| {
                Ok(LocationQty {
                    location_id: row.try_get("", "location_id")?,
                    location_name: row.try_get("", "location_name")?,
                    barcode: row.try_get("", "barcode")?,
                    qty: row.try_get("", "qty")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, DbErr>>()?;
        let total = checked_total(locations.iter().map(|l| l.qty))?;
        Ok(PartStock {
            part,
            total,
            locations,
        })
    }

    /// Everything held at the location with `barcode`.
    pub async fn stock_at_location(&self, barcode: &str) -> Result<LocationStock> {
        let location = directory::require_location(self.storage.connection(), barcode).await?;
        let rows = self
            .storage
            .all(
                "SELECT p.id AS part_id, p.part_number AS part_number, p.description AS description, s.qty AS qty \
                 FROM stock_entries s JOIN parts p ON s.part_id = p.id \
                 WHERE s.location_id = ? ORDER BY p.part_number",
                vec![location.id.into()],
            )
            .await?;
        let parts = rows
            .iter()
            .map(|row| {
                Ok(PartQty {
                    part_id: row.try_get("", "part_id")?,
                    part_number: row.try_get("", "part_number")?,
                    description: row.try_get("", "description")?,
                    qty: row.try_get("", "qty")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, DbErr>>()?;
        Ok(LocationStock { location, parts })
    }

    /// A part's transactions in commit order.
    pub async fn history(&self, part_number: &str) -> Result<Vec<transaction::Model>> {
        let part = directory::resolve_part(self.storage.connection(), part_number).await?;
        self.transactions_for(part.id).await
    }

    async fn transactions_for(&self, part_id: i64) -> Result<Vec<transaction::Model>> {
        Transaction::find()
            .filter(transaction::Column::PartId.eq(part_id))
            .order_by_asc(transaction::Column::Id)
            .all(self.storage.connection())
            .await
            .map_err(Into::into)
    }

    /// Per-location quantities of a part rebuilt from its transaction log.
    pub async fn replay(&self, part_id: i64) -> Result<BTreeMap<i64, i64>> {
        replay_transactions(&self.transactions_for(part_id).await?)
    }

    /// Compares a part's stored stock entries with a replay of its log.
    pub async fn verify_part(&self, part_id: i64) -> Result<StockCheck> {
        let replayed = self.replay(part_id).await?;
        let stored: BTreeMap<i64, i64> = StockEntry::find()
            .filter(stock_entry::Column::PartId.eq(part_id))
            .all(self.storage.connection())
            .await?
            .into_iter()
            .filter(|entry| entry.qty != 0)
            .map(|entry| (entry.location_id, entry.qty))
            .collect();
        let total = self.total_quantity(part_id).await?;
        Ok(StockCheck {
            part_id,
            stored,
            replayed,
            total,
        })
    }

    /// Runs [`Ledger::verify_part`] for every part.
    pub async fn verify_all(&self) -> Result<Vec<StockCheck>> {
        let mut checks = Vec::new();
        for part in directory::list_parts(self.storage.connection()).await? {
            checks.push(self.verify_part(part.id).await?);
        }
        Ok(checks)
    }
}
