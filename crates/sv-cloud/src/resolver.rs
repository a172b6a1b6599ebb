//! Database endpoint resolution.
//!
//! [`AwsCliResolver`] looks the cluster up with
//! `aws rds describe-db-clusters` and reads the writer endpoint from the JSON
//! response. It is a pure query: nothing is retried or cached.

use crate::command::{CommandRunner, SystemCommandRunner};
use crate::error::{CloudError, CloudResult};
use async_trait::async_trait;
use serde::Deserialize;
use sv_core::config::expand_cluster_identifier;
use sv_core::{Endpoint, Environment};

/// Error code the AWS CLI prints when a cluster identifier is unknown
const CLUSTER_NOT_FOUND_FAULT: &str = "DBClusterNotFoundFault";

/// Finds the connection endpoint of an environment's database
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    /// Resolve the endpoint for `environment` in `region`
    async fn resolve(&self, environment: Environment, region: &str) -> CloudResult<Endpoint>;
}

/// Resolver that always returns the same endpoint
#[derive(Debug, Clone)]
pub struct StaticResolver {
    endpoint: Endpoint,
}

impl StaticResolver {
    /// Resolve every lookup to `endpoint`
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl EndpointResolver for StaticResolver {
    async fn resolve(&self, _environment: Environment, _region: &str) -> CloudResult<Endpoint> {
        Ok(self.endpoint.clone())
    }
}

#[derive(Debug, Deserialize)]
struct DescribeDbClustersResponse {
    #[serde(rename = "DBClusters", default)]
    db_clusters: Vec<DbCluster>,
}

#[derive(Debug, Deserialize)]
struct DbCluster {
    #[serde(rename = "Endpoint")]
    endpoint: Option<String>,
    #[serde(rename = "Port")]
    port: Option<u16>,
    #[serde(rename = "Status")]
    status: Option<String>,
}

/// Resolves Aurora cluster endpoints through the AWS CLI
pub struct AwsCliResolver<R = SystemCommandRunner> {
    runner: R,
    program: String,
    cluster_template: String,
    default_port: u16,
}

impl AwsCliResolver<SystemCommandRunner> {
    /// Resolver running the `aws` binary found on PATH
    pub fn new(cluster_template: impl Into<String>, default_port: u16) -> Self {
        Self::with_runner(SystemCommandRunner, cluster_template, default_port)
    }
}

impl<R: CommandRunner> AwsCliResolver<R> {
    /// Resolver using a custom command runner
    pub fn with_runner(runner: R, cluster_template: impl Into<String>, default_port: u16) -> Self {
        Self {
            runner,
            program: "aws".to_string(),
            cluster_template: cluster_template.into(),
            default_port,
        }
    }

    /// Cluster identifier for an environment and region
    pub fn cluster_identifier(&self, environment: Environment, region: &str) -> String {
        expand_cluster_identifier(&self.cluster_template, environment, region)
    }

    fn describe_args(cluster: &str, region: &str) -> Vec<String> {
        [
            "rds",
            "describe-db-clusters",
            "--db-cluster-identifier",
            cluster,
            "--region",
            region,
            "--output",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn parse_response(&self, cluster: &str, stdout: &str) -> CloudResult<Endpoint> {
        let response: DescribeDbClustersResponse =
            serde_json::from_str(stdout).map_err(|e| CloudError::InvalidResponse {
                program: self.program.clone(),
                source: e,
            })?;

        let found = response
            .db_clusters
            .into_iter()
            .next()
            .ok_or_else(|| CloudError::EndpointNotFound {
                cluster: cluster.to_string(),
            })?;

        match found.endpoint.filter(|e| !e.is_empty()) {
            Some(host) => {
                if let Some(status) = &found.status {
                    log::debug!("Cluster {} status: {}", cluster, status);
                }
                Ok(Endpoint::network(
                    host,
                    found.port.unwrap_or(self.default_port),
                ))
            }
            None => Err(CloudError::EndpointUnavailable {
                cluster: cluster.to_string(),
            }),
        }
    }
}

#[async_trait]
impl<R: CommandRunner> EndpointResolver for AwsCliResolver<R> {
    async fn resolve(&self, environment: Environment, region: &str) -> CloudResult<Endpoint> {
        let cluster = self.cluster_identifier(environment, region);
        log::debug!("Looking up cluster {} in {}", cluster, region);

        let output = self
            .runner
            .run(&self.program, &Self::describe_args(&cluster, region))
            .await?;

        if !output.success() {
            if output.stderr.contains(CLUSTER_NOT_FOUND_FAULT) {
                return Err(CloudError::EndpointNotFound { cluster });
            }
            return Err(CloudError::CommandFailed {
                program: self.program.clone(),
                status: output.status_text(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        let endpoint = self.parse_response(&cluster, &output.stdout)?;
        log::info!("Found database cluster endpoint: {}", endpoint);
        Ok(endpoint)
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
