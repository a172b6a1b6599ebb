use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_migrate_defaults_are_unset() {
    let cli = Cli::try_parse_from(["schemaver", "migrate"]).unwrap();
    match cli.command {
        Commands::Migrate(args) => {
            assert!(args.target.environment.is_none());
            assert!(args.target.region.is_none());
            assert!(args.target.endpoint.is_none());
        }
        other => panic!("expected migrate, got {:?}", other),
    }
    assert!(!cli.global.verbose);
    assert_eq!(cli.global.project_dir, ".");
}

#[test]
fn test_migrate_target_flags() {
    let cli = Cli::try_parse_from([
        "schemaver",
        "migrate",
        "--environment",
        "prod",
        "--region",
        "eu-west-1",
        "--endpoint",
        "localhost:6543",
        "-v",
    ])
    .unwrap();
    match cli.command {
        Commands::Migrate(args) => {
            assert_eq!(args.target.environment, Some(Environment::Prod));
            assert_eq!(args.target.region.as_deref(), Some("eu-west-1"));
            assert_eq!(args.target.endpoint.as_deref(), Some("localhost:6543"));
        }
        other => panic!("expected migrate, got {:?}", other),
    }
    assert!(cli.global.verbose);
}

#[test]
fn test_unknown_environment_rejected() {
    assert!(Cli::try_parse_from(["schemaver", "status", "--environment", "staging"]).is_err());
}

#[test]
fn test_endpoint_conflicts_with_duckdb() {
    assert!(Cli::try_parse_from([
        "schemaver",
        "migrate",
        "--endpoint",
        "localhost",
        "--duckdb",
        "local.duckdb"
    ])
    .is_err());
}

#[test]
fn test_ls_scripts_dir() {
    let cli = Cli::try_parse_from(["schemaver", "ls", "--scripts-dir", "ddl"]).unwrap();
    match cli.command {
        Commands::Ls(args) => assert_eq!(args.scripts_dir, Some(PathBuf::from("ddl"))),
        other => panic!("expected ls, got {:?}", other),
    }
}
