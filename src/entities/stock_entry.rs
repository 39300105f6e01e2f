//! Stock entry entity - The quantity of one part at one location.
//!
//! At most one row exists per `(part_id, location_id)`; the pair is backed by a
//! unique index created alongside the table. `qty` is never negative.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_entries")]
pub struct Model {
    /// Unique identifier for the row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Part held
    pub part_id: i64,
    /// Location holding it
    pub location_id: i64,
    /// Quantity on hand at this location
    pub qty: i64,
}

/// Defines relationships between `StockEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each stock entry belongs to one part
    #[sea_orm(
        belongs_to = "super::part::Entity",
        from = "Column::PartId",
        to = "super::part::Column::Id",
        on_delete = "Cascade"
    )]
    Part,
    /// Each stock entry belongs to one location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id",
        on_delete = "Cascade"
    )]
    Location,
}

impl Related<super::part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
