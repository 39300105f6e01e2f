//! Part entity - A trackable item type identified by a unique part number.
//!
//! A part may be constrained to a single fixed location; once set, inbound and
//! outbound movements are only accepted at that location.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Part database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parts")]
pub struct Model {
    /// Unique identifier for the part
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable part number, the business key (e.g. `"TAN-000623"`)
    #[sea_orm(unique)]
    pub part_number: String,
    /// Free-text description
    pub description: String,
    /// Total quantity at or below which an alert is raised; 0 disables alerting
    pub min_qty: i64,
    /// The single location this part is constrained to, if any
    pub fixed_location_id: Option<i64>,
}

/// Defines relationships between Part and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Optional fixed location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::FixedLocationId",
        to = "super::location::Column::Id",
        on_delete = "SetNull"
    )]
    FixedLocation,
    /// One part has many stock entries
    #[sea_orm(has_many = "super::stock_entry::Entity")]
    StockEntries,
    /// One part has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One part has many alias barcodes
    #[sea_orm(has_many = "super::part_alias::Entity")]
    Aliases,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FixedLocation.def()
    }
}

impl Related<super::stock_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockEntries.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::part_alias::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Aliases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
