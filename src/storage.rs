//! Storage backend for the ledger.
//!
//! [`Storage`] owns the `SeaORM` connection and is the only thing the ledger,
//! directory and importer are handed. The engine (`SQLite` file or networked
//! `PostgreSQL`) is picked once from the connection URL; callers never branch on
//! it. Besides the entity API, `Storage` offers a narrow parameterized
//! `get`/`all`/`run` surface over raw SQL written with `?` placeholders.

use crate::entities::{Location, Part, PartAlias, StockEntry, Transaction, stock_entry};
use crate::errors::{Error, Result};
use sea_orm::sea_query::Index;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait, QueryResult, Schema,
    Statement, Value,
};
use tracing::{debug, info};

/// Which relational engine a [`Storage`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Embedded file-backed store
    Sqlite,
    /// Networked server store
    Postgres,
}

impl BackendKind {
    /// Picks the engine from a connection URL scheme.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(Error::Config {
                message: format!("Unsupported database scheme '{other}' in {url}"),
            }),
        }
    }

    const fn from_backend(backend: DbBackend) -> Option<Self> {
        match backend {
            DbBackend::Sqlite => Some(Self::Sqlite),
            DbBackend::Postgres => Some(Self::Postgres),
            _ => None,
        }
    }

    const fn db_backend(self) -> DbBackend {
        match self {
            Self::Sqlite => DbBackend::Sqlite,
            Self::Postgres => DbBackend::Postgres,
        }
    }
}

/// Outcome of a [`Storage::run`] statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Rowid of the inserted row (`SQLite` only; 0 on `PostgreSQL`)
    pub last_insert_id: u64,
    /// Number of rows touched
    pub rows_affected: u64,
}

/// Shared handle to the relational store.
#[derive(Debug)]
pub struct Storage {
    conn: DatabaseConnection,
    kind: BackendKind,
}

impl Storage {
    /// Connects to `url` and picks the backend from its scheme.
    pub async fn connect(url: &str) -> Result<Self> {
        let kind = BackendKind::from_url(url)?;
        let conn = Database::connect(url).await?;
        info!(backend = ?kind, "Connected to storage backend");
        Ok(Self { conn, kind })
    }

    /// Wraps an already opened connection.
    pub fn from_connection(conn: DatabaseConnection) -> Result<Self> {
        let kind =
            BackendKind::from_backend(conn.get_database_backend()).ok_or_else(|| Error::Config {
                message: "MySQL is not a supported backend".to_string(),
            })?;
        Ok(Self { conn, kind })
    }

    /// The underlying connection, for entity queries and transactions.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Backend this storage was constructed for.
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        self.kind
    }

    fn statement(&self, sql: &str, params: Vec<Value>) -> Statement {
        let sql = match self.kind {
            BackendKind::Sqlite => sql.to_string(),
            BackendKind::Postgres => numbered_placeholders(sql),
        };
        debug!(%sql, "Running raw statement");
        Statement::from_sql_and_values(self.kind.db_backend(), sql, params)
    }

    /// Returns the first row of `sql`, if any.
    pub async fn get(&self, sql: &str, params: Vec<Value>) -> Result<Option<QueryResult>> {
        self.conn
            .query_one(self.statement(sql, params))
            .await
            .map_err(Into::into)
    }

    /// Returns every row of `sql`.
    pub async fn all(&self, sql: &str, params: Vec<Value>) -> Result<Vec<QueryResult>> {
        self.conn
            .query_all(self.statement(sql, params))
            .await
            .map_err(Into::into)
    }

    /// Executes a write statement.
    pub async fn run(&self, sql: &str, params: Vec<Value>) -> Result<RunOutcome> {
        let result = self.conn.execute(self.statement(sql, params)).await?;
        Ok(RunOutcome {
            last_insert_id: result.last_insert_id(),
            rows_affected: result.rows_affected(),
        })
    }

    /// Creates all ledger tables and indexes if they do not exist yet.
    ///
    /// Tables are generated from the entity definitions so the schema always
    /// matches the Rust models. The unique `(part_id, location_id)` index on
    /// stock entries is what the ledger's upsert relies on.
    pub async fn create_tables(&self) -> Result<()> {
        let builder = self.conn.get_database_backend();
        let schema = Schema::new(builder);

        let mut tables = vec![
            schema.create_table_from_entity(Location),
            schema.create_table_from_entity(Part),
            schema.create_table_from_entity(StockEntry),
            schema.create_table_from_entity(Transaction),
            schema.create_table_from_entity(PartAlias),
        ];
        for table in &mut tables {
            table.if_not_exists();
            self.conn.execute(builder.build(&*table)).await?;
        }

        let stock_key = Index::create()
            .name("idx_stock_entries_part_location")
            .table(StockEntry)
            .col(stock_entry::Column::PartId)
            .col(stock_entry::Column::LocationId)
            .unique()
            .if_not_exists()
            .to_owned();
        self.conn.execute(builder.build(&stock_key)).await?;

        // Probe so a broken schema fails here rather than on first scan
        StockEntry::find().one(&self.conn).await?;
        Ok(())
    }
}

/// Rewrites `?` placeholders into `$1, $2, ...`, leaving quoted literals alone.
fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut in_literal = false;
    let mut n = 0;
    for c in sql.chars() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                out.push(c);
            }
            '?' if !in_literal => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use sea_orm::MockDatabase;

    #[test]
    fn test_backend_kind_from_url() {
        assert_eq!(
            BackendKind::from_url("sqlite::memory:").unwrap(),
            BackendKind::Sqlite
        );
        assert_eq!(
            BackendKind::from_url("postgres://u:p@localhost/parts").unwrap(),
            BackendKind::Postgres
        );
        assert!(matches!(
            BackendKind::from_url("mysql://localhost/parts"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_numbered_placeholders_skip_literals() {
        assert_eq!(
            numbered_placeholders("SELECT * FROM parts WHERE part_number = ? AND description <> '?' AND id > ?"),
            "SELECT * FROM parts WHERE part_number = $1 AND description <> '?' AND id > $2"
        );
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let storage = setup_test_db().await?;
        storage.create_tables().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_raw_get_all_run() -> Result<()> {
        let storage = setup_test_db().await?;

        let outcome = storage
            .run(
                "INSERT INTO locations (name, barcode) VALUES (?, ?)",
                vec!["Shelf A".into(), "LOC-A".into()],
            )
            .await?;
        assert_eq!(outcome.rows_affected, 1);
        assert!(outcome.last_insert_id > 0);

        let row = storage
            .get(
                "SELECT name FROM locations WHERE barcode = ?",
                vec!["LOC-A".into()],
            )
            .await?
            .unwrap();
        assert_eq!(row.try_get::<String>("", "name")?, "Shelf A");

        let missing = storage
            .get(
                "SELECT name FROM locations WHERE barcode = ?",
                vec!["'; DROP TABLE locations; --".into()],
            )
            .await?;
        assert!(missing.is_none());

        let rows = storage.all("SELECT id FROM locations", vec![]).await?;
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[test]
    fn test_from_connection_reads_backend() {
        let postgres = MockDatabase::new(DbBackend::Postgres).into_connection();
        let storage = Storage::from_connection(postgres).unwrap();
        assert_eq!(storage.kind(), BackendKind::Postgres);

        let mysql = MockDatabase::new(DbBackend::MySql).into_connection();
        assert!(matches!(
            Storage::from_connection(mysql),
            Err(Error::Config { .. })
        ));
    }
}
