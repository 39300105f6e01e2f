//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the ledger tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod location;
pub mod part;
pub mod part_alias;
pub mod stock_entry;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use location::{Column as LocationColumn, Entity as Location, Model as LocationModel};
pub use part::{Column as PartColumn, Entity as Part, Model as PartModel};
pub use part_alias::{Column as PartAliasColumn, Entity as PartAlias, Model as PartAliasModel};
pub use stock_entry::{
    Column as StockEntryColumn, Entity as StockEntry, Model as StockEntryModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
