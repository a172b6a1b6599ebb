use super::*;
use crate::command::CommandOutput;
use std::sync::Mutex;

/// Returns one canned output and records the invocation
struct FakeRunner {
    output: CommandOutput,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeRunner {
    fn new(code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            output: CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[String]) -> CloudResult<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        Ok(self.output.clone())
    }
}

const TEMPLATE: &str = "{environment}-{region}-aurora-cluster";

fn resolver(runner: FakeRunner) -> AwsCliResolver<FakeRunner> {
    AwsCliResolver::with_runner(runner, TEMPLATE, 5432)
}

#[tokio::test]
async fn test_resolves_endpoint_and_port() {
    let r = resolver(FakeRunner::new(
        0,
        r#"{"DBClusters": [{
            "DBClusterIdentifier": "qa-us-east-1-aurora-cluster",
            "Endpoint": "qa.cluster-abc.us-east-1.rds.amazonaws.com",
            "Port": 6543,
            "Status": "available"
        }]}"#,
        "",
    ));

    let endpoint = r.resolve(Environment::Qa, "us-east-1").await.unwrap();
    assert_eq!(
        endpoint,
        Endpoint::network("qa.cluster-abc.us-east-1.rds.amazonaws.com", 6543)
    );

    let calls = r.runner.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "aws");
    assert_eq!(
        calls[0].1,
        vec![
            "rds",
            "describe-db-clusters",
            "--db-cluster-identifier",
            "qa-us-east-1-aurora-cluster",
            "--region",
            "us-east-1",
            "--output",
            "json"
        ]
    );
}

#[tokio::test]
async fn test_missing_port_uses_default() {
    let r = resolver(FakeRunner::new(
        0,
        r#"{"DBClusters": [{"Endpoint": "dev.cluster.local"}]}"#,
        "",
    ));
    let endpoint = r.resolve(Environment::Dev, "us-east-1").await.unwrap();
    assert_eq!(endpoint, Endpoint::network("dev.cluster.local", 5432));
}

#[tokio::test]
async fn test_not_found_fault() {
    let r = resolver(FakeRunner::new(
        254,
        "",
        "An error occurred (DBClusterNotFoundFault) when calling the DescribeDBClusters operation: DBCluster prod-us-east-1-aurora-cluster not found.",
    ));
    match r.resolve(Environment::Prod, "us-east-1").await {
        Err(CloudError::EndpointNotFound { cluster }) => {
            assert_eq!(cluster, "prod-us-east-1-aurora-cluster")
        }
        other => panic!("expected EndpointNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_cluster_list_is_not_found() {
    let r = resolver(FakeRunner::new(0, r#"{"DBClusters": []}"#, ""));
    assert!(matches!(
        r.resolve(Environment::Dev, "us-east-1").await,
        Err(CloudError::EndpointNotFound { .. })
    ));
}

#[tokio::test]
async fn test_cluster_without_endpoint_is_unavailable() {
    let r = resolver(FakeRunner::new(
        0,
        r#"{"DBClusters": [{"DBClusterIdentifier": "dev-us-east-1-aurora-cluster", "Status": "creating"}]}"#,
        "",
    ));
    assert!(matches!(
        r.resolve(Environment::Dev, "us-east-1").await,
        Err(CloudError::EndpointUnavailable { .. })
    ));

    let r = resolver(FakeRunner::new(
        0,
        r#"{"DBClusters": [{"Endpoint": ""}]}"#,
        "",
    ));
    assert!(matches!(
        r.resolve(Environment::Dev, "us-east-1").await,
        Err(CloudError::EndpointUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_other_cli_failure() {
    let r = resolver(FakeRunner::new(
        255,
        "",
        "Unable to locate credentials. You can configure credentials by running \"aws configure\".\n",
    ));
    match r.resolve(Environment::Dev, "us-east-1").await {
        Err(CloudError::CommandFailed { status, stderr, .. }) => {
            assert_eq!(status, "exit code 255");
            assert!(stderr.starts_with("Unable to locate credentials"));
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_output_is_invalid_response() {
    let r = resolver(FakeRunner::new(0, "not json", ""));
    assert!(matches!(
        r.resolve(Environment::Dev, "us-east-1").await,
        Err(CloudError::InvalidResponse { .. })
    ));
}

#[tokio::test]
async fn test_static_resolver() {
    let r = StaticResolver::new(Endpoint::network("localhost", 5432));
    assert_eq!(
        r.resolve(Environment::Prod, "eu-west-1").await.unwrap(),
        Endpoint::network("localhost", 5432)
    );
}
