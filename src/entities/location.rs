//! Location entity - A physical storage place identified by a unique barcode.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Location database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    /// Unique identifier for the location
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g. "Shelf A, bin 3")
    #[sea_orm(unique)]
    pub name: String,
    /// Scanned identifier printed on the shelf label
    #[sea_orm(unique)]
    pub barcode: String,
}

/// Defines relationships between Location and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One location holds many stock entries
    #[sea_orm(has_many = "super::stock_entry::Entity")]
    StockEntries,
    /// One location has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
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

impl ActiveModelBehavior for ActiveModel {}
