//! DuckDB version store backend
//!
//! Targets a local DuckDB file. Used to rehearse a script set before it
//! reaches the cluster and as the store behind the end-to-end tests.

use crate::error::{DbError, DbResult};
use crate::traits::{StoreConnector, VersionStore, VersionTable};
use async_trait::async_trait;
use duckdb::Connection;
use std::path::PathBuf;
use sv_core::{Endpoint, SchemaVersion, VersionTableConfig};

/// Default schema of a DuckDB database
pub const DUCKDB_DEFAULT_SCHEMA: &str = "main";

/// DuckDB version store backend
pub struct DuckDbBackend {
    path: PathBuf,
    table: VersionTable,
}

impl DuckDbBackend {
    /// Create a backend for an existing database file
    pub fn new(path: impl Into<PathBuf>, table: VersionTable) -> Self {
        Self {
            path: path.into(),
            table,
        }
    }

    /// Open a fresh connection; dropped by the caller when the operation ends.
    fn open(&self) -> DbResult<Connection> {
        if !self.path.exists() {
            return Err(DbError::ConnectionError(format!(
                "database file not found: {}",
                self.path.display()
            )));
        }
        Connection::open(&self.path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", self.path.display())))
    }

    fn table_exists(&self, conn: &Connection) -> duckdb::Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            duckdb::params![self.table.schema, self.table.table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn version_column(&self, conn: &Connection) -> duckdb::Result<Option<(String, Option<i64>)>> {
        let mut stmt = conn.prepare(
            "SELECT data_type, CAST(numeric_scale AS BIGINT) FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? AND column_name = 'version_number'",
        )?;
        let mut rows = stmt.query(duckdb::params![self.table.schema, self.table.table])?;
        match rows.next()? {
            Some(row) => Ok(Some((row.get(0)?, row.get(1)?))),
            None => Ok(None),
        }
    }

    /// Refuse a version column that would not read back what was written
    fn verify_version_column(&self, conn: &Connection) -> Result<(), String> {
        let column = self.version_column(conn).map_err(|e| e.to_string())?;
        self.table.check_version_column(
            column
                .as_ref()
                .map(|(data_type, scale)| (data_type.as_str(), *scale)),
        )
    }

    fn read_version_sync(&self, conn: &Connection) -> duckdb::Result<Option<String>> {
        let sql = format!(
            "SELECT CAST(version_number AS VARCHAR) FROM {} WHERE component = ?",
            self.table.qualified()
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(duckdb::params![self.table.component])?;
        match rows.next()? {
            Some(row) => row.get::<_, Option<String>>(0),
            None => Ok(None),
        }
    }

    fn write_version_sync(&self, conn: &Connection, version: SchemaVersion) -> duckdb::Result<()> {
        let sql = format!(
            "INSERT INTO {} (component, version_number) VALUES (?, ?) \
             ON CONFLICT (component) DO UPDATE SET version_number = EXCLUDED.version_number",
            self.table.qualified()
        );
        conn.execute(
            &sql,
            duckdb::params![self.table.component, version.to_string()],
        )?;
        Ok(())
    }

    /// Run `sql` between `BEGIN` and `COMMIT`, rolling back on error.
    fn apply_script_sync(&self, conn: &Connection, sql: &str) -> DbResult<()> {
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::ExecutionError(format!("BEGIN failed: {e}")))?;

        if let Err(e) = conn.execute_batch(sql) {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(DbError::ExecutionError(e.to_string()));
        }

        if let Err(e) = conn.execute_batch("COMMIT") {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(DbError::ExecutionError(format!("COMMIT failed: {e}")));
        }
        Ok(())
    }
}

#[async_trait]
impl VersionStore for DuckDbBackend {
    async fn check_connection(&self) -> DbResult<()> {
        let conn = self.open()?;
        drop(conn);
        Ok(())
    }

    async fn probe_schema(&self) -> DbResult<bool> {
        let conn = self.open()?;
        let exists = self
            .table_exists(&conn)
            .map_err(|e| DbError::ReadError(e.to_string()))?;
        if exists {
            self.verify_version_column(&conn)
                .map_err(DbError::ReadError)?;
        }
        Ok(exists)
    }

    async fn read_version(&self) -> DbResult<Option<SchemaVersion>> {
        let conn = self.open()?;
        let exists = self
            .table_exists(&conn)
            .map_err(|e| DbError::ReadError(e.to_string()))?;
        if !exists {
            log::info!("{} table does not exist", self.table.table);
            return Ok(None);
        }
        self.verify_version_column(&conn)
            .map_err(DbError::ReadError)?;

        let raw = self
            .read_version_sync(&conn)
            .map_err(|e| DbError::ReadError(e.to_string()))?;

        match raw {
            Some(raw) => SchemaVersion::parse(&raw)
                .map(Some)
                .map_err(|e| DbError::ReadError(e.to_string())),
            None => Ok(None),
        }
    }

    async fn write_version(&self, version: SchemaVersion) -> DbResult<()> {
        let conn = self.open()?;
        self.verify_version_column(&conn)
            .map_err(DbError::WriteError)?;
        self.write_version_sync(&conn, version)
            .map_err(|e| DbError::WriteError(e.to_string()))
    }

    async fn apply_script(&self, sql: &str) -> DbResult<()> {
        let conn = self.open()?;
        self.apply_script_sync(&conn, sql)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Connects file endpoints to [`DuckDbBackend`]
pub struct DuckDbConnector {
    table: VersionTableConfig,
}

impl DuckDbConnector {
    /// Create a connector using the given version table settings
    pub fn new(table: VersionTableConfig) -> Self {
        Self { table }
    }
}

impl StoreConnector for DuckDbConnector {
    fn connect(&self, endpoint: &Endpoint) -> DbResult<Box<dyn VersionStore>> {
        match endpoint {
            Endpoint::File(path) => Ok(Box::new(DuckDbBackend::new(
                path.clone(),
                VersionTable::from_config(&self.table, DUCKDB_DEFAULT_SCHEMA),
            ))),
            Endpoint::Network { .. } => Err(DbError::UnsupportedEndpoint {
                backend: "duckdb".to_string(),
                endpoint: endpoint.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
