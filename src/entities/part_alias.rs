//! Part alias entity - A secondary barcode resolving to a canonical part.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Part alias database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "part_aliases")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The alternative code as scanned
    #[sea_orm(unique)]
    pub code: String,
    /// Part the code resolves to
    pub part_id: i64,
}

/// Defines relationships between `PartAlias` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each alias belongs to one part
    #[sea_orm(
        belongs_to = "super::part::Entity",
        from = "Column::PartId",
        to = "super::part::Column::Id",
        on_delete = "Cascade"
    )]
    Part,
}

impl Related<super::part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
