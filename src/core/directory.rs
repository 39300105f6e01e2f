//! Directory of parts and locations.
//!
//! Resolves scanned codes to identity records and creates them. The directory
//! never touches quantities. Lookups are generic over `ConnectionTrait` so the
//! ledger can run them inside its own database transaction.

use crate::{
    entities::{
        Location, Part, PartAlias, StockEntry, Transaction, location, part, part_alias,
        stock_entry, transaction,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info};

/// Fields for a new part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPart {
    /// Business key; required
    pub part_number: String,
    /// Free-text description
    pub description: Option<String>,
    /// Minimum quantity; the configured default when absent
    pub min_qty: Option<i64>,
}

/// Partial update of a part. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartPatch {
    /// New part number
    pub part_number: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New minimum quantity
    pub min_qty: Option<i64>,
    /// New fixed location
    pub fixed_location_id: Option<i64>,
}

impl PartPatch {
    /// True when the patch would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.part_number.is_none()
            && self.description.is_none()
            && self.min_qty.is_none()
            && self.fixed_location_id.is_none()
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn check_min_qty(min_qty: i64) -> Result<i64> {
    if min_qty < 0 {
        return Err(Error::validation(format!(
            "min_qty must be >= 0, got {min_qty}"
        )));
    }
    Ok(min_qty)
}

/// Finds a part by its canonical part number.
pub async fn find_part_by_number<C: ConnectionTrait>(
    db: &C,
    part_number: &str,
) -> Result<Option<part::Model>> {
    Part::find()
        .filter(part::Column::PartNumber.eq(part_number.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a part by primary key.
pub async fn find_part_by_id<C: ConnectionTrait>(
    db: &C,
    part_id: i64,
) -> Result<Option<part::Model>> {
    Part::find_by_id(part_id).one(db).await.map_err(Into::into)
}

/// Lists all parts ordered by part number.
pub async fn list_parts<C: ConnectionTrait>(db: &C) -> Result<Vec<part::Model>> {
    Part::find()
        .order_by_asc(part::Column::PartNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_alias<C: ConnectionTrait>(db: &C, code: &str) -> Result<Option<part_alias::Model>> {
    PartAlias::find()
        .filter(part_alias::Column::Code.eq(code.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a part by its canonical number or, failing that, by an alias.
pub async fn find_part<C: ConnectionTrait>(db: &C, code: &str) -> Result<Option<part::Model>> {
    if let Some(part) = find_part_by_number(db, code).await? {
        return Ok(Some(part));
    }
    let Some(alias) = find_alias(db, code).await? else {
        return Ok(None);
    };
    debug!(alias = %alias.code, part_id = alias.part_id, "Resolved alias barcode");
    find_part_by_id(db, alias.part_id).await
}

/// Resolves a scanned code to a canonical part number.
///
/// Canonical part numbers win; the alias table is only consulted when no part
/// carries `code` as its own number.
pub async fn resolve_alias<C: ConnectionTrait>(db: &C, code: &str) -> Result<Option<String>> {
    Ok(find_part(db, code).await?.map(|p| p.part_number))
}

/// Resolves a part number or alias to its part, or fails with `NotFound`.
pub async fn resolve_part<C: ConnectionTrait>(db: &C, code: &str) -> Result<part::Model> {
    let code = required("part_number", code)?;
    find_part(db, &code)
        .await?
        .ok_or_else(|| Error::not_found("part", code))
}

async fn check_part_number_free<C: ConnectionTrait>(
    db: &C,
    part_number: &str,
    except_id: Option<i64>,
) -> Result<()> {
    if let Some(other) = find_part_by_number(db, part_number).await? {
        if Some(other.id) != except_id {
            return Err(Error::validation(format!(
                "part {part_number} already exists"
            )));
        }
    }
    // A part number equal to an alias would take over that alias's scans
    if let Some(alias) = find_alias(db, part_number).await? {
        return Err(Error::validation(format!(
            "{part_number} is already an alias of part id {}",
            alias.part_id
        )));
    }
    Ok(())
}

/// Creates a part. `default_min_qty` applies when `new.min_qty` is absent.
pub async fn create_part<C: ConnectionTrait>(
    db: &C,
    new: NewPart,
    default_min_qty: i64,
) -> Result<part::Model> {
    let part_number = required("part_number", &new.part_number)?;
    let min_qty = check_min_qty(new.min_qty.unwrap_or(default_min_qty))?;

    check_part_number_free(db, &part_number, None).await?;

    let part = part::ActiveModel {
        part_number: Set(part_number),
        description: Set(new.description.unwrap_or_default().trim().to_string()),
        min_qty: Set(min_qty),
        fixed_location_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(part_number = %part.part_number, "Created part");
    Ok(part)
}

/// Applies a partial update to a part.
pub async fn update_part<C: ConnectionTrait>(
    db: &C,
    part_id: i64,
    patch: PartPatch,
) -> Result<part::Model> {
    let existing = find_part_by_id(db, part_id)
        .await?
        .ok_or_else(|| Error::not_found("part", part_id.to_string()))?;
    if patch.is_empty() {
        return Ok(existing);
    }

    let mut active: part::ActiveModel = existing.into();
    if let Some(part_number) = patch.part_number {
        let part_number = required("part_number", &part_number)?;
        check_part_number_free(db, &part_number, Some(part_id)).await?;
        active.part_number = Set(part_number);
    }
    if let Some(description) = patch.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(min_qty) = patch.min_qty {
        active.min_qty = Set(check_min_qty(min_qty)?);
    }
    if let Some(location_id) = patch.fixed_location_id {
        find_location_by_id(db, location_id)
            .await?
            .ok_or_else(|| Error::not_found("location", location_id.to_string()))?;
        active.fixed_location_id = Set(Some(location_id));
    }
    active.update(db).await.map_err(Into::into)
}

/// Creates the part if it does not exist, otherwise applies `patch` to it.
///
/// `part_number` may be an alias, in which case the aliased part is updated.
/// Returns the part and whether it was created.
pub async fn upsert_part<C: ConnectionTrait>(
    db: &C,
    part_number: &str,
    patch: PartPatch,
    default_min_qty: i64,
) -> Result<(part::Model, bool)> {
    let part_number = required("part_number", part_number)?;
    if let Some(existing) = find_part(db, &part_number).await? {
        let updated = update_part(db, existing.id, patch).await?;
        return Ok((updated, false));
    }

    let fixed_location_id = patch.fixed_location_id;
    let created = create_part(
        db,
        NewPart {
            part_number,
            description: patch.description,
            min_qty: patch.min_qty,
        },
        default_min_qty,
    )
    .await?;
    let created = match fixed_location_id {
        Some(location_id) => {
            update_part(
                db,
                created.id,
                PartPatch {
                    fixed_location_id: Some(location_id),
                    ..Default::default()
                },
            )
            .await?
        }
        None => created,
    };
    Ok((created, true))
}

/// Assigns (`Some`) or clears (`None`) a part's fixed location.
pub async fn set_fixed_location<C: ConnectionTrait>(
    db: &C,
    part_number: &str,
    location_barcode: Option<&str>,
) -> Result<part::Model> {
    let part = resolve_part(db, part_number).await?;
    let location_id = match location_barcode {
        Some(barcode) => Some(require_location(db, barcode).await?.id),
        None => None,
    };
    let mut active: part::ActiveModel = part.into();
    active.fixed_location_id = Set(location_id);
    active.update(db).await.map_err(Into::into)
}

/// Pins `part` to `location` unless it already has a fixed location.
///
/// The write only matches a part whose fixed location is still empty, so of
/// two concurrent first receipts exactly one wins. Returns the stored part and
/// whether this call pinned it; fails with `FixedLocationConflict` when the
/// part ends up fixed somewhere else.
pub async fn claim_fixed_location<C: ConnectionTrait>(
    db: &C,
    part: &part::Model,
    location: &location::Model,
) -> Result<(part::Model, bool)> {
    let claimed = Part::update_many()
        .col_expr(part::Column::FixedLocationId, Expr::value(Some(location.id)))
        .filter(part::Column::Id.eq(part.id))
        .filter(part::Column::FixedLocationId.is_null())
        .exec(db)
        .await?
        .rows_affected
        > 0;

    let current = find_part_by_id(db, part.id)
        .await?
        .ok_or_else(|| Error::not_found("part", part.part_number.clone()))?;
    match current.fixed_location_id {
        Some(id) if id == location.id => {
            if claimed {
                info!(part_number = %current.part_number, location = %location.barcode, "Assigned fixed location");
            }
            Ok((current, claimed))
        }
        Some(id) => {
            let fixed = find_location_by_id(db, id)
                .await?
                .ok_or_else(|| Error::not_found("location", id.to_string()))?;
            Err(Error::FixedLocationConflict {
                part_number: current.part_number,
                fixed_location: fixed.barcode,
                requested_location: location.barcode.clone(),
            })
        }
        None => Err(Error::Database(DbErr::Custom(format!(
            "fixed location of part {} was not stored",
            current.part_number
        )))),
    }
}

/// Registers `alias` as a secondary code for `part_number`.
pub async fn add_alias<C: ConnectionTrait>(
    db: &C,
    part_number: &str,
    alias: &str,
) -> Result<part_alias::Model> {
    let alias = required("alias", alias)?;
    let part = resolve_part(db, part_number).await?;
    if find_part_by_number(db, &alias).await?.is_some() {
        return Err(Error::validation(format!(
            "alias {alias} is already a part number"
        )));
    }
    if find_alias(db, &alias).await?.is_some() {
        return Err(Error::validation(format!("alias {alias} is already in use")));
    }

    part_alias::ActiveModel {
        code: Set(alias),
        part_id: Set(part.id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Deletes a part together with its transactions, stock entries and aliases.
pub async fn delete_part(db: &DatabaseConnection, part_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let part = find_part_by_id(&txn, part_id)
        .await?
        .ok_or_else(|| Error::not_found("part", part_id.to_string()))?;

    Transaction::delete_many()
        .filter(transaction::Column::PartId.eq(part_id))
        .exec(&txn)
        .await?;
    StockEntry::delete_many()
        .filter(stock_entry::Column::PartId.eq(part_id))
        .exec(&txn)
        .await?;
    PartAlias::delete_many()
        .filter(part_alias::Column::PartId.eq(part_id))
        .exec(&txn)
        .await?;
    Part::delete_by_id(part_id).exec(&txn).await?;

    txn.commit().await?;
    info!(part_number = %part.part_number, "Deleted part and its history");
    Ok(())
}

/// Finds a location by its barcode.
pub async fn find_location_by_barcode<C: ConnectionTrait>(
    db: &C,
    barcode: &str,
) -> Result<Option<location::Model>> {
    Location::find()
        .filter(location::Column::Barcode.eq(barcode.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a location by primary key.
pub async fn find_location_by_id<C: ConnectionTrait>(
    db: &C,
    location_id: i64,
) -> Result<Option<location::Model>> {
    Location::find_by_id(location_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a location by barcode or fails with `NotFound`.
pub async fn require_location<C: ConnectionTrait>(
    db: &C,
    barcode: &str,
) -> Result<location::Model> {
    let barcode = required("location_barcode", barcode)?;
    find_location_by_barcode(db, &barcode)
        .await?
        .ok_or_else(|| Error::not_found("location", barcode))
}

/// Lists all locations ordered by name.
pub async fn list_locations<C: ConnectionTrait>(db: &C) -> Result<Vec<location::Model>> {
    Location::find()
        .order_by_asc(location::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a location. Both name and barcode must be unique.
pub async fn create_location<C: ConnectionTrait>(
    db: &C,
    name: &str,
    barcode: &str,
) -> Result<location::Model> {
    let name = required("name", name)?;
    let barcode = required("barcode", barcode)?;
    check_location_unique(db, &name, &barcode, None).await?;

    let location = location::ActiveModel {
        name: Set(name),
        barcode: Set(barcode),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(barcode = %location.barcode, "Created location");
    Ok(location)
}

/// Returns the location for `code`, creating it (named after the code) if needed.
///
/// `code` is matched against barcodes first and display names second. The flag
/// is `true` when the location was created.
pub async fn get_or_create_location<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<(location::Model, bool)> {
    let code = required("location", code)?;
    if let Some(location) = find_location_by_barcode(db, &code).await? {
        return Ok((location, false));
    }
    if let Some(location) = Location::find()
        .filter(location::Column::Name.eq(code.as_str()))
        .one(db)
        .await?
    {
        return Ok((location, false));
    }
    Ok((create_location(db, &code, &code).await?, true))
}

/// Renames a location and/or changes its barcode.
pub async fn update_location<C: ConnectionTrait>(
    db: &C,
    location_id: i64,
    name: &str,
    barcode: &str,
) -> Result<location::Model> {
    let name = required("name", name)?;
    let barcode = required("barcode", barcode)?;
    let existing = find_location_by_id(db, location_id)
        .await?
        .ok_or_else(|| Error::not_found("location", location_id.to_string()))?;
    check_location_unique(db, &name, &barcode, Some(location_id)).await?;

    let mut active: location::ActiveModel = existing.into();
    active.name = Set(name);
    active.barcode = Set(barcode);
    active.update(db).await.map_err(Into::into)
}

/// Deletes a location, its stock entries and transactions, and unpins parts fixed to it.
pub async fn delete_location(db: &DatabaseConnection, location_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let location = find_location_by_id(&txn, location_id)
        .await?
        .ok_or_else(|| Error::not_found("location", location_id.to_string()))?;

    Transaction::delete_many()
        .filter(transaction::Column::LocationId.eq(location_id))
        .exec(&txn)
        .await?;
    StockEntry::delete_many()
        .filter(stock_entry::Column::LocationId.eq(location_id))
        .exec(&txn)
        .await?;
    Part::update_many()
        .col_expr(
            part::Column::FixedLocationId,
            Expr::value(Option::<i64>::None),
        )
        .filter(part::Column::FixedLocationId.eq(location_id))
        .exec(&txn)
        .await?;
    Location::delete_by_id(location_id).exec(&txn).await?;

    txn.commit().await?;
    info!(barcode = %location.barcode, "Deleted location and its stock");
    Ok(())
}

async fn check_location_unique<C: ConnectionTrait>(
    db: &C,
    name: &str,
    barcode: &str,
    except_id: Option<i64>,
) -> Result<()> {
    let clash = Location::find()
        .filter(
            Condition::any()
                .add(location::Column::Name.eq(name))
                .add(location::Column::Barcode.eq(barcode)),
        )
        .all(db)
        .await?
        .into_iter()
        .find(|l| Some(l.id) != except_id);
    if let Some(other) = clash {
        return Err(Error::validation(format!(
            "location name or barcode already used by {} ({})",
            other.name, other.barcode
        )));
    }
    Ok(())
}
