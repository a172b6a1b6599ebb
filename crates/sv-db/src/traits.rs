//! Version store trait definitions

use crate::error::DbResult;
use async_trait::async_trait;
use sv_core::{Endpoint, SchemaVersion, VersionTableConfig, DATABASE_VERSION_COMPONENT};

/// Access to the persisted schema version and script execution.
///
/// Every method opens its own connection and releases it before returning,
/// whatever the outcome. Implementations must be Send + Sync for async
/// operation.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Open a connection and close it again
    async fn check_connection(&self) -> DbResult<()>;

    /// Whether the version tracking table exists. Absence is `Ok(false)`.
    async fn probe_schema(&self) -> DbResult<bool>;

    /// Persisted version, or `None` when the table or row is absent
    async fn read_version(&self) -> DbResult<Option<SchemaVersion>>;

    /// Upsert the persisted version in its own committed statement
    async fn write_version(&self, version: SchemaVersion) -> DbResult<()>;

    /// Execute a full script inside one transaction
    async fn apply_script(&self, sql: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Builds a [`VersionStore`] for a resolved endpoint
pub trait StoreConnector: Send + Sync {
    /// Create a store bound to `endpoint`. No connection is opened here.
    fn connect(&self, endpoint: &Endpoint) -> DbResult<Box<dyn VersionStore>>;
}

/// Identity of the version tracking table inside a target database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTable {
    /// Schema holding the table
    pub schema: String,
    /// Table name
    pub table: String,
    /// Component key of the version row
    pub component: String,
}

impl VersionTable {
    /// Build from config, using `default_schema` when none is configured
    pub fn from_config(config: &VersionTableConfig, default_schema: &str) -> Self {
        Self {
            schema: config
                .schema
                .clone()
                .unwrap_or_else(|| default_schema.to_string()),
            table: config.table.clone(),
            component: DATABASE_VERSION_COMPONENT.to_string(),
        }
    }

    /// `"schema"."table"`
    pub fn qualified(&self) -> String {
        format!("\"{}\".\"{}\"", self.schema, self.table)
    }

    /// Check that the `version_number` column reads back exactly what was
    /// written. `column` is its `information_schema.columns` data type and
    /// numeric scale, or `None` when the column is missing.
    ///
    /// Text and unconstrained NUMERIC qualify. A fixed scale pads `1.5` to
    /// `1.50`, which reads back as minor 50; integer and float types lose
    /// digits.
    pub fn check_version_column(&self, column: Option<(&str, Option<i64>)>) -> Result<(), String> {
        let Some((data_type, numeric_scale)) = column else {
            return Err(format!("{} has no version_number column", self.qualified()));
        };
        let base = data_type
            .split('(')
            .next()
            .unwrap_or(data_type)
            .trim()
            .to_ascii_lowercase();
        let exact = match base.as_str() {
            "text" | "varchar" | "character varying" | "character" | "bpchar" | "string" => true,
            "numeric" | "decimal" => numeric_scale.is_none(),
            _ => false,
        };
        if exact {
            return Ok(());
        }
        let scale = numeric_scale
            .map(|s| format!(" (scale {})", s))
            .unwrap_or_default();
        Err(format!(
            "{}.version_number has type {}{}, which cannot hold a schema version exactly; \
             use unconstrained NUMERIC or a text type",
            self.qualified(),
            data_type,
            scale
        ))
    }
}
