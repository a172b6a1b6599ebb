//! Deployment environments and database endpoints.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Deployment environment a migration targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development (default)
    #[default]
    Dev,
    /// Quality assurance
    Qa,
    /// Production
    Prod,
}

impl Environment {
    /// Lowercase name used in resource identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Qa => "qa",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "qa" => Ok(Environment::Qa),
            "prod" => Ok(Environment::Prod),
            _ => Err(CoreError::InvalidEnvironment {
                value: s.to_string(),
            }),
        }
    }
}

/// Where the target database lives once resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A network database server
    Network { host: String, port: u16 },
    /// A local database file
    File(PathBuf),
}

impl Endpoint {
    /// Network endpoint shorthand
    pub fn network(host: impl Into<String>, port: u16) -> Self {
        Endpoint::Network {
            host: host.into(),
            port,
        }
    }

    /// Parse `host` or `host:port`, falling back to `default_port`.
    pub fn parse_host_port(value: &str, default_port: u16) -> Result<Self, CoreError> {
        let invalid = || CoreError::ConfigInvalid {
            message: format!("Invalid endpoint '{}': expected host[:port]", value),
        };
        let value = value.trim();
        match value.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port.parse().map_err(|_| invalid())?;
                if host.is_empty() {
                    return Err(invalid());
                }
                Ok(Endpoint::network(host, port))
            }
            None if !value.is_empty() => Ok(Endpoint::network(value, default_port)),
            None => Err(invalid()),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Network { host, port } => write!(f, "{}:{}", host, port),
            Endpoint::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_round_trip_names() {
        for env in [Environment::Dev, Environment::Qa, Environment::Prod] {
            assert_eq!(env.as_str().parse::<Environment>().unwrap(), env);
        }
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_parse_host_port() {
        assert_eq!(
            Endpoint::parse_host_port("db.internal:6543", 5432).unwrap(),
            Endpoint::network("db.internal", 6543)
        );
        assert_eq!(
            Endpoint::parse_host_port("db.internal", 5432).unwrap(),
            Endpoint::network("db.internal", 5432)
        );
        assert!(Endpoint::parse_host_port(":5432", 5432).is_err());
        assert!(Endpoint::parse_host_port("db:notaport", 5432).is_err());
        assert!(Endpoint::parse_host_port("", 5432).is_err());
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::network("h", 5432).to_string(), "h:5432");
        assert_eq!(
            Endpoint::File(PathBuf::from("/tmp/x.duckdb")).to_string(),
            "/tmp/x.duckdb"
        );
    }
}
