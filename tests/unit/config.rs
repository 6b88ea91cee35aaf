//! Scenario files and stack configuration.

use std::io::Write;

use canary_stack::{ConfigError, DemoScenario, StackConfig, VerifyMode};
use tempfile::NamedTempFile;

use crate::common::GROWTH_SCENARIO;

#[test]
fn test_load_scenario_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(GROWTH_SCENARIO.as_bytes()).unwrap();

    let scenario = DemoScenario::load(file.path()).unwrap();
    assert_eq!(scenario.pushes.len(), 9);
    assert_eq!(scenario.pops, 9);
    assert!(!scenario.self_test);
    assert_eq!(scenario.stack, StackConfig::entry_only());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DemoScenario::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{ \"pushes\": [1, ").unwrap();

    let err = DemoScenario::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("invalid scenario"));
}

#[test]
fn test_default_scenario_is_the_classic_demo() {
    let scenario = DemoScenario::default();
    assert_eq!(scenario.pushes, vec![8.5, 9.5]);
    assert_eq!(scenario.pops, 2);
    assert!(scenario.peek);
    assert_eq!(scenario.stack.verify_mode, VerifyMode::Strict);
}
