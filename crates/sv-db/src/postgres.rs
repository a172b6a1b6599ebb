//! PostgreSQL version store backend (Aurora PostgreSQL in production)

use crate::error::{DbError, DbResult};
use crate::traits::{StoreConnector, VersionStore, VersionTable};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor};
use std::time::Duration;
use sv_core::{Endpoint, SchemaVersion, VersionTableConfig};

/// Default schema of a PostgreSQL database
pub const POSTGRES_DEFAULT_SCHEMA: &str = "public";

/// Login settings shared by every connection to one database
#[derive(Clone)]
pub struct PgSettings {
    /// Database name
    pub database: String,
    /// Login user
    pub user: String,
    /// Login password
    pub password: String,
    /// Upper bound on establishing a connection
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for PgSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSettings")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// PostgreSQL version store backend
pub struct PostgresBackend {
    options: PgConnectOptions,
    connect_timeout: Duration,
    target: String,
    table: VersionTable,
}

impl PostgresBackend {
    /// Create a backend for `host:port`. No connection is opened here.
    pub fn new(host: &str, port: u16, settings: &PgSettings, table: VersionTable) -> Self {
        let options = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(&settings.database)
            .username(&settings.user)
            .password(&settings.password)
            .application_name("schemaver");
        Self {
            options,
            connect_timeout: settings.connect_timeout,
            target: format!("{}@{}:{}/{}", settings.user, host, port, settings.database),
            table,
        }
    }

    /// Open a connection, bounded by the connect timeout
    async fn open(&self) -> DbResult<PgConnection> {
        match tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&self.options))
            .await
        {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(DbError::ConnectionError(format!(
                "{}: {}",
                self.target,
                describe(&e)
            ))),
            Err(_) => Err(DbError::ConnectionError(format!(
                "{}: timed out after {}s",
                self.target,
                self.connect_timeout.as_secs()
            ))),
        }
    }

    async fn table_exists(&self, conn: &mut PgConnection) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT FROM information_schema.tables
                 WHERE table_schema = $1 AND table_name = $2
             )",
        )
        .bind(&self.table.schema)
        .bind(&self.table.table)
        .fetch_one(&mut *conn)
        .await
    }

    async fn version_column(
        &self,
        conn: &mut PgConnection,
    ) -> Result<Option<(String, Option<i32>)>, sqlx::Error> {
        sqlx::query_as::<_, (String, Option<i32>)>(
            "SELECT data_type::text, numeric_scale::int4 FROM information_schema.columns
             WHERE table_schema = $1 AND table_name = $2 AND column_name = 'version_number'",
        )
        .bind(&self.table.schema)
        .bind(&self.table.table)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Refuse a version column that would not read back what was written
    async fn verify_version_column(&self, conn: &mut PgConnection) -> Result<(), String> {
        let column = self
            .version_column(conn)
            .await
            .map_err(|e| describe(&e))?;
        self.table.check_version_column(
            column
                .as_ref()
                .map(|(data_type, scale)| (data_type.as_str(), scale.map(i64::from))),
        )
    }

    async fn probe_on(&self, conn: &mut PgConnection) -> DbResult<bool> {
        let exists = self
            .table_exists(conn)
            .await
            .map_err(|e| DbError::ReadError(describe(&e)))?;
        if exists {
            self.verify_version_column(conn)
                .await
                .map_err(DbError::ReadError)?;
        }
        Ok(exists)
    }

    async fn read_version_on(&self, conn: &mut PgConnection) -> DbResult<Option<SchemaVersion>> {
        let exists = self
            .table_exists(conn)
            .await
            .map_err(|e| DbError::ReadError(describe(&e)))?;
        if !exists {
            log::info!("{} table does not exist", self.table.table);
            return Ok(None);
        }
        self.verify_version_column(conn)
            .await
            .map_err(DbError::ReadError)?;

        let sql = format!(
            "SELECT version_number::text FROM {} WHERE component = $1",
            self.table.qualified()
        );
        let raw = sqlx::query_scalar::<_, Option<String>>(&sql)
            .bind(&self.table.component)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| DbError::ReadError(describe(&e)))?
            .flatten();

        match raw {
            Some(raw) => SchemaVersion::parse(&raw)
                .map(Some)
                .map_err(|e| DbError::ReadError(e.to_string())),
            None => {
                log::info!(
                    "{} component not found in {} table",
                    self.table.component,
                    self.table.table
                );
                Ok(None)
            }
        }
    }

    async fn write_version_on(
        &self,
        conn: &mut PgConnection,
        version: SchemaVersion,
    ) -> DbResult<()> {
        self.verify_version_column(conn)
            .await
            .map_err(DbError::WriteError)?;
        let sql = format!(
            "INSERT INTO {} (component, version_number) VALUES ($1, CAST($2 AS NUMERIC))
             ON CONFLICT (component) DO UPDATE SET version_number = EXCLUDED.version_number",
            self.table.qualified()
        );
        sqlx::query(&sql)
            .bind(&self.table.component)
            .bind(version.to_string())
            .execute(&mut *conn)
            .await
            .map_err(|e| DbError::WriteError(describe(&e)))?;
        Ok(())
    }
}

/// Execute `sql` in one transaction, rolling back on error.
async fn apply_in_transaction(conn: &mut PgConnection, sql: &str) -> DbResult<()> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| DbError::ExecutionError(format!("BEGIN failed: {}", describe(&e))))?;

    // A bare &str goes over the simple query protocol, so a script may hold
    // many statements.
    if let Err(e) = (&mut *tx).execute(sql).await {
        let _ = tx.rollback().await;
        return Err(DbError::ExecutionError(describe(&e)));
    }

    tx.commit()
        .await
        .map_err(|e| DbError::ExecutionError(format!("COMMIT failed: {}", describe(&e))))
}

/// Close a connection gracefully; a failed close only matters for logging.
async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        log::debug!("Closing database connection failed: {}", describe(&e));
    }
}

/// Render an sqlx error with its SQLSTATE when the server sent one
fn describe(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => match db.code() {
            Some(code) => format!("{} (SQLSTATE {})", db.message(), code),
            None => db.message().to_string(),
        },
        other => other.to_string(),
    }
}

#[async_trait]
impl VersionStore for PostgresBackend {
    async fn check_connection(&self) -> DbResult<()> {
        let conn = self.open().await?;
        release(conn).await;
        Ok(())
    }

    async fn probe_schema(&self) -> DbResult<bool> {
        let mut conn = self.open().await?;
        let result = self.probe_on(&mut conn).await;
        release(conn).await;
        result
    }

    async fn read_version(&self) -> DbResult<Option<SchemaVersion>> {
        let mut conn = self.open().await?;
        let result = self.read_version_on(&mut conn).await;
        release(conn).await;
        result
    }

    async fn write_version(&self, version: SchemaVersion) -> DbResult<()> {
        let mut conn = self.open().await?;
        let result = self.write_version_on(&mut conn, version).await;
        release(conn).await;
        result
    }

    async fn apply_script(&self, sql: &str) -> DbResult<()> {
        let mut conn = self.open().await?;
        let result = apply_in_transaction(&mut conn, sql).await;
        release(conn).await;
        result
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }
}

/// Connects network endpoints to [`PostgresBackend`]
pub struct PostgresConnector {
    settings: PgSettings,
    table: VersionTableConfig,
}

impl PostgresConnector {
    /// Create a connector from login settings and version table settings
    pub fn new(settings: PgSettings, table: VersionTableConfig) -> Self {
        Self { settings, table }
    }
}

impl StoreConnector for PostgresConnector {
    fn connect(&self, endpoint: &Endpoint) -> DbResult<Box<dyn VersionStore>> {
        match endpoint {
            Endpoint::Network { host, port } => Ok(Box::new(PostgresBackend::new(
                host,
                *port,
                &self.settings,
                VersionTable::from_config(&self.table, POSTGRES_DEFAULT_SCHEMA),
            ))),
            Endpoint::File(_) => Err(DbError::UnsupportedEndpoint {
                backend: "postgres".to_string(),
                endpoint: endpoint.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
