//! Configuration types and parsing for schemaver.yml
//!
//! Every field has a default matching the MTK backend deployment, so the
//! file is optional.

use crate::catalog::ScriptPattern;
use crate::environment::Environment;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file names looked up in a project directory, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["schemaver.yml", "schemaver.yaml"];

/// Component key of the persisted schema version row
pub const DATABASE_VERSION_COMPONENT: &str = "database_version";

/// Main configuration from schemaver.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Product prefix of script file names (`<product>_ddl_v1.0.sql`)
    #[serde(default = "default_product")]
    pub product: String,

    /// Directory holding the DDL scripts, relative to the project directory
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: String,

    /// Default environment when none is given on the command line
    #[serde(default)]
    pub environment: Environment,

    /// Default cloud region when none is given on the command line
    #[serde(default = "default_region")]
    pub region: String,

    /// Cluster identifier template; `{environment}` and `{region}` are substituted
    #[serde(default = "default_cluster_identifier")]
    pub cluster_identifier: String,

    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Location of the version tracking table
    #[serde(default)]
    pub version_table: VersionTableConfig,

    /// Log file receiving a copy of every log line
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database name
    #[serde(default = "default_db_name")]
    pub name: String,

    /// Login user
    #[serde(default = "default_db_user")]
    pub user: String,

    /// Port used when the endpoint lookup does not report one
    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Environment variable holding the password
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_db_name(),
            user: default_db_user(),
            port: default_db_port(),
            password_env: default_password_env(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    /// Connect timeout as a [`Duration`]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read the password from the configured environment variable.
    pub fn password(&self) -> CoreResult<String> {
        match std::env::var(&self.password_env) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(CoreError::MissingSecret {
                var: self.password_env.clone(),
            }),
        }
    }
}

/// Where the version tracking table lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionTableConfig {
    /// Table name
    #[serde(default = "default_version_table")]
    pub table: String,

    /// Schema name; backend default when unset
    #[serde(default)]
    pub schema: Option<String>,
}

impl Default for VersionTableConfig {
    fn default() -> Self {
        Self {
            table: default_version_table(),
            schema: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product: default_product(),
            scripts_dir: default_scripts_dir(),
            environment: Environment::default(),
            region: default_region(),
            cluster_identifier: default_cluster_identifier(),
            database: DatabaseConfig::default(),
            version_table: VersionTableConfig::default(),
            log_file: None,
        }
    }
}

fn default_product() -> String {
    "mtk_backend".to_string()
}

fn default_scripts_dir() -> String {
    "data".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_cluster_identifier() -> String {
    "{environment}-{region}-aurora-cluster".to_string()
}

fn default_db_name() -> String {
    "mtk_backend".to_string()
}

fn default_db_user() -> String {
    "mtk_admin".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_password_env() -> String {
    "mtk_db_password".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_version_table() -> String {
    "version_info".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load schemaver.yml (or .yaml) from a directory, or defaults if absent
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
        {
            Some(path) => Self::load(&path),
            None => {
                log::debug!("No config file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.product.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "product cannot be empty".to_string(),
            });
        }

        if self.region.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "region cannot be empty".to_string(),
            });
        }

        if !self.cluster_identifier.contains("{environment}") {
            log::warn!(
                "cluster_identifier '{}' does not contain {{environment}}; every environment resolves the same cluster",
                self.cluster_identifier
            );
        }

        if self.database.connect_timeout_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "database.connect_timeout_secs must be greater than 0".to_string(),
            });
        }

        if !is_valid_identifier(&self.version_table.table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "version_table.table '{}' is not a valid identifier",
                    self.version_table.table
                ),
            });
        }

        if let Some(schema) = &self.version_table.schema {
            if !is_valid_identifier(schema) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("version_table.schema '{}' is not a valid identifier", schema),
                });
            }
        }

        Ok(())
    }

    /// Cluster identifier for an environment and region
    pub fn cluster_identifier_for(&self, environment: Environment, region: &str) -> String {
        expand_cluster_identifier(&self.cluster_identifier, environment, region)
    }

    /// Scripts directory resolved against a project root
    pub fn scripts_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.scripts_dir)
    }

    /// File-name pattern for this product's scripts
    pub fn script_pattern(&self) -> CoreResult<ScriptPattern> {
        ScriptPattern::new(&self.product)
    }
}

/// Substitute `{environment}` and `{region}` in a cluster identifier template
pub fn expand_cluster_identifier(template: &str, environment: Environment, region: &str) -> String {
    template
        .replace("{environment}", environment.as_str())
        .replace("{region}", region)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
