//! End-to-end migration runs against a DuckDB file.

use duckdb::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use sv_cloud::StaticResolver;
use sv_core::{Endpoint, Environment, ScriptPattern, VersionTableConfig};
use sv_db::DuckDbConnector;
use sv_migrate::{ErrorKind, MigrationRunner, RunOptions, RunPhase};
use tempfile::TempDir;

const BASELINE_DDL: &str = "CREATE TABLE version_info (
    component VARCHAR PRIMARY KEY,
    version_number VARCHAR NOT NULL
);";

struct Project {
    _dir: TempDir,
    db_path: PathBuf,
    scripts_dir: PathBuf,
}

impl Project {
    /// A database already at the baseline schema, with an empty scripts dir
    fn new() -> Self {
        Self::with_baseline(BASELINE_DDL)
    }

    /// A database already at `baseline`, which also serves as script 1.0
    fn with_baseline(baseline: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("rehearsal.duckdb");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(baseline).unwrap();
        drop(conn);

        let scripts_dir = dir.path().join("data");
        fs::create_dir(&scripts_dir).unwrap();
        write_script(&scripts_dir, "1.0", baseline);

        Self {
            _dir: dir,
            db_path,
            scripts_dir,
        }
    }

    fn script(&self, version: &str, sql: &str) -> &Self {
        write_script(&self.scripts_dir, version, sql);
        self
    }

    fn runner(&self) -> MigrationRunner {
        MigrationRunner::new(
            Box::new(StaticResolver::new(Endpoint::File(self.db_path.clone()))),
            Box::new(DuckDbConnector::new(VersionTableConfig::default())),
            RunOptions {
                environment: Environment::Dev,
                region: "us-east-1".to_string(),
                scripts_dir: self.scripts_dir.clone(),
                pattern: ScriptPattern::new("mtk_backend").unwrap(),
            },
        )
    }

    fn version(&self) -> Option<String> {
        let conn = Connection::open(&self.db_path).unwrap();
        conn.query_row(
            "SELECT CAST(version_number AS VARCHAR) FROM version_info WHERE component = 'database_version'",
            [],
            |row| row.get(0),
        )
        .ok()
    }

    fn table_exists(&self, name: &str) -> bool {
        let conn = Connection::open(&self.db_path).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count > 0
    }

    fn columns(&self, table: &str) -> Vec<String> {
        let conn = Connection::open(&self.db_path).unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_name = ? ORDER BY ordinal_position",
            )
            .unwrap();
        stmt.query_map([table], |row| row.get::<_, String>(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }
}

fn write_script(dir: &Path, version: &str, sql: &str) {
    fs::write(dir.join(format!("mtk_backend_ddl_v{}.sql", version)), sql).unwrap();
}

#[tokio::test]
async fn test_full_migration_from_baseline() {
    let project = Project::new();
    project
        .script(
            "1.1",
            "#database_version=1.1\nCREATE TABLE orders (id INTEGER PRIMARY KEY, total DECIMAL(10,2));",
        )
        .script("1.2", "ALTER TABLE orders ADD COLUMN placed_at TIMESTAMP;")
        .script("1.10", "CREATE TABLE refunds (order_id INTEGER, amount DECIMAL(10,2));");

    let mut runner = project.runner();
    let report = runner.run().await.unwrap();

    assert_eq!(runner.phase(), RunPhase::Done);
    assert_eq!(report.persisted_version, None);
    assert_eq!(report.applied.len(), 3);
    assert_eq!(report.final_version.to_string(), "1.10");
    assert_eq!(project.version().as_deref(), Some("1.10"));
    assert_eq!(project.columns("orders"), vec!["id", "total", "placed_at"]);
    assert!(project.table_exists("refunds"));
}

#[tokio::test]
async fn test_rerun_applies_nothing() {
    let project = Project::new();
    project.script("1.1", "CREATE TABLE orders (id INTEGER);");

    project.runner().run().await.unwrap();
    let report = project.runner().run().await.unwrap();

    assert!(report.applied.is_empty());
    assert_eq!(report.persisted_version.map(|v| v.to_string()).as_deref(), Some("1.1"));
    assert_eq!(project.version().as_deref(), Some("1.1"));
}

#[tokio::test]
async fn test_new_script_applied_incrementally() {
    let project = Project::new();
    project.script("1.1", "CREATE TABLE orders (id INTEGER);");
    project.runner().run().await.unwrap();

    project.script("2.0", "CREATE TABLE customers (id INTEGER);");
    let report = project.runner().run().await.unwrap();

    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].file, "mtk_backend_ddl_v2.0.sql");
    assert_eq!(project.version().as_deref(), Some("2.0"));
    assert!(project.table_exists("customers"));
}

#[tokio::test]
async fn test_failing_script_rolls_back_and_stops() {
    let project = Project::new();
    project
        .script("1.1", "CREATE TABLE orders (id INTEGER);")
        .script(
            "1.2",
            "CREATE TABLE shipments (id INTEGER);\nALTER TABLE missing_table ADD COLUMN x INTEGER;",
        )
        .script("1.3", "CREATE TABLE invoices (id INTEGER);");

    let mut runner = project.runner();
    let err = runner.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ScriptExecution);
    assert_eq!(runner.phase(), RunPhase::Failed);
    assert_eq!(project.version().as_deref(), Some("1.1"));
    assert!(project.table_exists("orders"));
    assert!(!project.table_exists("shipments"));
    assert!(!project.table_exists("invoices"));
}

#[tokio::test]
async fn test_plan_leaves_database_untouched() {
    let project = Project::new();
    project.script("1.1", "CREATE TABLE orders (id INTEGER);");

    let report = project.runner().plan().await.unwrap();

    assert_eq!(report.pending.len(), 1);
    assert_eq!(project.version(), None);
    assert!(!project.table_exists("orders"));
}

#[tokio::test]
async fn test_missing_database_file_is_a_connectivity_error() {
    let project = Project::new();
    fs::remove_file(&project.db_path).unwrap();

    let err = project.runner().run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert!(!project.db_path.exists());
}

const FIXED_SCALE_DDL: &str = "CREATE TABLE version_info (
    component VARCHAR PRIMARY KEY,
    version_number DECIMAL(5,2) NOT NULL
);";

#[tokio::test]
async fn test_fixed_scale_version_column_stops_the_run() {
    let project = Project::with_baseline(FIXED_SCALE_DDL);
    let conn = Connection::open(&project.db_path).unwrap();
    conn.execute_batch("INSERT INTO version_info VALUES ('database_version', 1.5);")
        .unwrap();
    drop(conn);
    project
        .script("1.5", "CREATE TABLE orders (id INTEGER);")
        .script("1.6", "CREATE TABLE invoices (id INTEGER);");

    // The stored value reads back as 1.50; gating on it would skip 1.6.
    let mut runner = project.runner();
    let err = runner.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StoreRead);
    assert!(err.to_string().contains("scale 2"), "{err}");
    assert_eq!(runner.phase(), RunPhase::Failed);
    assert!(!project.table_exists("invoices"));
    assert_eq!(project.version().as_deref(), Some("1.50"));
}

#[tokio::test]
async fn test_fixed_scale_version_column_is_never_written() {
    let project = Project::with_baseline(FIXED_SCALE_DDL);
    project.script("1.5", "CREATE TABLE orders (id INTEGER);");

    let err = project.runner().run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::VersionAdvance);
    assert_eq!(project.version(), None);
    assert!(project.table_exists("orders"));
}
