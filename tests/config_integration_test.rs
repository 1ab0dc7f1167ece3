//! Integration tests for configuration loading and validation
//!
//! Tests that read or modify environment variables hold `ENV_MUTEX`.

use concept_exporter::config::{load_config, load_from_env};
use concept_exporter::domain::ExporterError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn lock_env() -> MutexGuard<'static, ()> {
    let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    for var in [
        "CONCEPT_EXPORTER_APPLICATION_LOG_LEVEL",
        "CONCEPT_EXPORTER_SERVER_PORT",
        "CONCEPT_EXPORTER_NEO4J_BASE_URL",
        "CONCEPT_EXPORTER_S3_WRITER_MAX_RETRIES",
        "CONCEPT_EXPORTER_EXPORT_CONCEPT_TYPES",
        "TEST_NEO4J_PASSWORD",
    ] {
        std::env::remove_var(var);
    }
    guard
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = lock_env();
    let temp_file = write_config(
        r#"
[application]
name = "concept-exporter"
system_code = "upp-concept-exporter"
log_level = "debug"

[server]
bind_address = "127.0.0.1"
port = 9000
request_timeout_seconds = 30

[neo4j]
base_url = "http://neo4j.example.com:7474"
database = "graph"
username = "neo4j"
password = "graph-pass"
timeout_seconds = 600

[s3_writer]
base_url = "http://concept-rw-s3.example.com"
health_url = "http://concept-rw-s3.example.com/__health"
timeout_seconds = 15

[s3_writer.retry]
max_retries = 5
initial_delay_ms = 100
max_delay_ms = 2000
backoff_multiplier = 1.5

[export]
concept_types = ["Brand", "Organisation"]
api_base_url = "https://api.example.com"

[logging]
local_enabled = false
local_path = "/tmp/concept-exporter"
local_rotation = "hourly"
console_format = "json"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.system_code, "upp-concept-exporter");
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.server.listen_address(), "127.0.0.1:9000");
    assert_eq!(config.neo4j.database, "graph");
    assert_eq!(config.neo4j.username.as_deref(), Some("neo4j"));
    assert_eq!(
        config.neo4j.password.as_ref().unwrap().expose_secret(),
        "graph-pass"
    );
    assert_eq!(
        config.s3_writer.health_url(),
        "http://concept-rw-s3.example.com/__health"
    );
    assert_eq!(config.s3_writer.retry.max_retries, 5);
    assert_eq!(config.s3_writer.retry.backoff_multiplier, 1.5);

    let supported: Vec<String> = config
        .export
        .supported_concept_types()
        .iter()
        .map(|t| t.to_string())
        .collect();
    assert_eq!(supported, vec!["Brand", "Organisation"]);
    assert_eq!(config.export.api_base_url, "https://api.example.com");
    assert_eq!(config.logging.console_format, "json");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = lock_env();
    let temp_file = write_config("[neo4j]\nbase_url = \"http://neo4j:7474\"\n");

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.neo4j.database, "neo4j");
    assert!(config.neo4j.username.is_none());
    assert_eq!(config.s3_writer.health_url(), "http://localhost:8080/__gtg");
    assert_eq!(config.s3_writer.retry.max_retries, 3);
    assert_eq!(
        config.export.concept_types,
        vec!["Brand", "Topic", "Location", "Person", "Organisation"]
    );
    assert_eq!(config.export.api_base_url, "http://api.ft.com");
}

#[test]
fn test_env_var_substitution() {
    let _lock = lock_env();
    std::env::set_var("TEST_NEO4J_PASSWORD", "substituted");

    let temp_file = write_config(
        r#"
[neo4j]
username = "neo4j"
password = "${TEST_NEO4J_PASSWORD}"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");
    assert_eq!(
        config.neo4j.password.as_ref().unwrap().expose_secret(),
        "substituted"
    );

    std::env::remove_var("TEST_NEO4J_PASSWORD");
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = lock_env();
    let temp_file = write_config(
        r#"
[neo4j]
username = "neo4j"
password = "${TEST_NEO4J_PASSWORD}"
"#,
    );

    let err = load_config(temp_file.path()).unwrap_err();
    assert!(matches!(err, ExporterError::Configuration(_)));
    assert!(err.to_string().contains("TEST_NEO4J_PASSWORD"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = lock_env();
    std::env::set_var("CONCEPT_EXPORTER_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("CONCEPT_EXPORTER_SERVER_PORT", "9999");
    std::env::set_var("CONCEPT_EXPORTER_S3_WRITER_MAX_RETRIES", "1");
    std::env::set_var("CONCEPT_EXPORTER_EXPORT_CONCEPT_TYPES", "Brand, Person");

    let temp_file = write_config("[application]\nlog_level = \"debug\"\n");
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.s3_writer.retry.max_retries, 1);
    assert_eq!(config.export.concept_types, vec!["Brand", "Person"]);

    let from_env = load_from_env().expect("Failed to load from env");
    assert_eq!(from_env.server.port, 9999);

    for var in [
        "CONCEPT_EXPORTER_APPLICATION_LOG_LEVEL",
        "CONCEPT_EXPORTER_SERVER_PORT",
        "CONCEPT_EXPORTER_S3_WRITER_MAX_RETRIES",
        "CONCEPT_EXPORTER_EXPORT_CONCEPT_TYPES",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
fn test_invalid_override_value() {
    let _lock = lock_env();
    std::env::set_var("CONCEPT_EXPORTER_SERVER_PORT", "not-a-port");

    let err = load_from_env().unwrap_err();
    assert!(err.to_string().contains("CONCEPT_EXPORTER_SERVER_PORT"));

    std::env::remove_var("CONCEPT_EXPORTER_SERVER_PORT");
}

#[test]
fn test_validation_errors() {
    let _lock = lock_env();

    let cases = [
        ("[export]\nconcept_types = []\n", "concept_types"),
        ("[export]\nconcept_types = [\"Brand\", \"Brand\"]\n", "Brand"),
        ("[neo4j]\nbase_url = \"not a url\"\n", "base_url"),
        ("[neo4j]\nusername = \"neo4j\"\n", "password"),
        ("[s3_writer.retry]\nmax_retries = 50\n", "max_retries"),
        ("[logging]\nconsole_format = \"xml\"\n", "console_format"),
    ];

    for (contents, expected) in cases {
        let temp_file = write_config(contents);
        let err = load_config(temp_file.path()).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "{contents:?} gave {err}"
        );
    }
}

#[test]
fn test_missing_file() {
    let err = load_config("/nonexistent/concept-exporter.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}
