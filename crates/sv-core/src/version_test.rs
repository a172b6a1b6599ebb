use super::*;

#[test]
fn test_parse_simple_version() {
    let v = SchemaVersion::parse("1.5").unwrap();
    assert_eq!(v.major(), 1);
    assert_eq!(v.minor(), 5);
    assert_eq!(v.to_string(), "1.5");
}

#[test]
fn test_parse_trims_whitespace() {
    assert_eq!(
        SchemaVersion::parse("  2.3\n").unwrap(),
        SchemaVersion::new(2, 3)
    );
}

#[test]
fn test_parse_rejects_malformed() {
    for bad in ["", "1", "1.", ".5", "v1.0", "1.0.0", "1.a", "-1.0", "1. 0"] {
        assert!(
            matches!(
                SchemaVersion::parse(bad),
                Err(CoreError::InvalidVersion { .. })
            ),
            "expected '{}' to be rejected",
            bad
        );
    }
}

#[test]
fn test_ordering_is_numeric_per_component() {
    let v1_9 = SchemaVersion::parse("1.9").unwrap();
    let v1_10 = SchemaVersion::parse("1.10").unwrap();
    assert!(v1_10 > v1_9);
    assert!(SchemaVersion::parse("2.0").unwrap() > v1_10);
}

#[test]
fn test_sort_mixed_versions() {
    let mut versions: Vec<SchemaVersion> = ["2.3", "1.10", "1.0", "1.9", "2.0"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    versions.sort();
    let rendered: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
    assert_eq!(rendered, vec!["1.0", "1.9", "1.10", "2.0", "2.3"]);
}

#[test]
fn test_baseline_is_one_zero() {
    assert_eq!(SchemaVersion::BASELINE, SchemaVersion::new(1, 0));
    assert_eq!(SchemaVersion::BASELINE.to_string(), "1.0");
}

#[test]
fn test_serde_as_string() {
    let v: SchemaVersion = serde_yaml::from_str("\"2.10\"").unwrap();
    assert_eq!(v, SchemaVersion::new(2, 10));
    let out = serde_yaml::to_string(&v).unwrap();
    let back: SchemaVersion = serde_yaml::from_str(&out).unwrap();
    assert_eq!(back, v);
}
