//! Tests for configuration loading and validation.

use std::io::Write;

use figment::providers::{Format, Serialized, Toml};
use figment::Figment;

use crate::config::{PregelConfig, DEFAULT_MAX_ITERATIONS};
use crate::error::Error;
use crate::messages::MessengerKind;
use crate::partition::Partitioning;

#[test]
fn test_defaults_are_valid() {
    let config = PregelConfig::default();
    assert!(config.concurrency >= 1);
    assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
    assert_eq!(config.page_shift, 12);
    assert_eq!(config.partitioning, Partitioning::Range);
    assert_eq!(config.messenger, MessengerKind::Auto);
    config.validate().unwrap();
}

#[test]
fn test_toml_overrides_defaults() {
    let figment = Figment::from(Serialized::defaults(PregelConfig::default())).merge(
        Toml::string(
            r#"
            concurrency = 3
            max_iterations = 7
            partitioning = "degree"
            messenger = "reducing"
            max_array_length = 8
            "#,
        ),
    );
    let config = PregelConfig::from_figment(&figment).unwrap();
    assert_eq!(config.concurrency, 3);
    assert_eq!(config.max_iterations, 7);
    assert_eq!(config.partitioning, Partitioning::Degree);
    assert_eq!(config.messenger, MessengerKind::Reducing);
    assert_eq!(config.page_shift, 12);
    assert_eq!(config.max_array_length, 8);
}

#[test]
fn test_malformed_toml_is_configuration_error() {
    let figment = Figment::from(Serialized::defaults(PregelConfig::default()))
        .merge(Toml::string("partitioning = \"random\""));
    assert!(matches!(
        PregelConfig::from_figment(&figment),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_validate_rejects_bad_bounds() {
    let zero_threads = PregelConfig::default().with_concurrency(0);
    assert!(matches!(zero_threads.validate(), Err(Error::Configuration(_))));

    let zero_iterations = PregelConfig::default().with_max_iterations(0);
    assert!(matches!(zero_iterations.validate(), Err(Error::Configuration(_))));

    let huge_pages = PregelConfig::default().with_page_shift(31);
    assert!(matches!(huge_pages.validate(), Err(Error::Capacity(_))));

    let no_budget = PregelConfig::default().with_memory_budget(0);
    assert!(no_budget.validate().is_err());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_iterations = 42\npage_shift = 10").unwrap();
    let config = PregelConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.max_iterations, 42);
    assert_eq!(config.page_shift, 10);
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        PregelConfig::load(Some(&missing)),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_toml_round_trip_of_effective_config() {
    let config = PregelConfig::default()
        .with_concurrency(2)
        .with_partitioning(Partitioning::Degree)
        .with_memory_budget(1 << 20);
    let text = config.to_toml_string().unwrap();
    assert!(text.contains("partitioning = \"degree\""));

    let figment = Figment::from(Toml::string(&text));
    assert_eq!(PregelConfig::from_figment(&figment).unwrap(), config);
}
