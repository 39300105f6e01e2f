/// Database URL resolution from the environment
pub mod database;

/// Ledger and alert settings loaded from `partstore.toml`
pub mod settings;

pub use database::database_url;
pub use settings::{AlertSettings, AppConfig, LedgerSettings, load_app_configuration};
