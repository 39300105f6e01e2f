//! Transaction entity - Immutable record of one stock movement or correction.
//!
//! `qty` is the unsigned magnitude of the movement and `action` says which way it
//! went (`"in"`, `"out"` or `"set"`). `qty_after` is the stock entry's quantity
//! once the movement was applied, which lets `set` corrections replay exactly.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier, increasing in commit order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Part moved
    pub part_id: i64,
    /// Location the movement happened at
    pub location_id: i64,
    /// Magnitude of the movement
    pub qty: i64,
    /// `"in"`, `"out"` or `"set"`
    pub action: String,
    /// Quantity at the location after this movement
    pub qty_after: i64,
    /// Operator who made the movement, if known
    pub user_name: Option<String>,
    /// When the movement was committed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one part
    #[sea_orm(
        belongs_to = "super::part::Entity",
        from = "Column::PartId",
        to = "super::part::Column::Id",
        on_delete = "Cascade"
    )]
    Part,
    /// Each transaction belongs to one location
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
