//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ExporterConfig;
use crate::config::secret_string;
use crate::domain::errors::ExporterError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "CONCEPT_EXPORTER";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ExporterConfig
/// 4. Applies environment variable overrides (CONCEPT_EXPORTER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ExporterError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use concept_exporter::config::loader::load_config;
///
/// let config = load_config("concept-exporter.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ExporterConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExporterError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExporterError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let mut config = parse_config(&contents)?;
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ExporterError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Builds a configuration from defaults and environment overrides only
///
/// Used when no configuration file exists, e.g. in containers that are
/// configured entirely through the environment.
///
/// # Errors
///
/// Returns an error if an override has an invalid value or the resulting
/// configuration fails validation.
pub fn load_from_env() -> Result<ExporterConfig> {
    let mut config = ExporterConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        ExporterError::Configuration(format!("Configuration validation failed: {e}"))
    })?;
    Ok(config)
}

fn parse_config(contents: &str) -> Result<ExporterConfig> {
    let contents = substitute_env_vars(contents)?;
    toml::from_str(&contents)
        .map_err(|e| ExporterError::Configuration(format!("Failed to parse TOML: {e}")))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ExporterError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExporterError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_var(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn parse_env<T: std::str::FromStr>(section: &str, key: &str) -> Result<Option<T>> {
    match env_var(section, key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            ExporterError::Configuration(format!(
                "Invalid value '{raw}' for {ENV_PREFIX}_{section}_{key}"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the CONCEPT_EXPORTER_* prefix
///
/// Environment variables follow the pattern `CONCEPT_EXPORTER_<SECTION>_<KEY>`,
/// for example `CONCEPT_EXPORTER_NEO4J_BASE_URL`.
fn apply_env_overrides(config: &mut ExporterConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_var("APPLICATION", "SYSTEM_CODE") {
        config.application.system_code = val;
    }

    // Server overrides
    if let Some(val) = env_var("SERVER", "BIND_ADDRESS") {
        config.server.bind_address = val;
    }
    if let Some(val) = parse_env("SERVER", "PORT")? {
        config.server.port = val;
    }

    // Neo4j overrides
    if let Some(val) = env_var("NEO4J", "BASE_URL") {
        config.neo4j.base_url = val;
    }
    if let Some(val) = env_var("NEO4J", "DATABASE") {
        config.neo4j.database = val;
    }
    if let Some(val) = env_var("NEO4J", "USERNAME") {
        config.neo4j.username = Some(val);
    }
    if let Some(val) = env_var("NEO4J", "PASSWORD") {
        config.neo4j.password = Some(secret_string(val));
    }
    if let Some(val) = parse_env("NEO4J", "TIMEOUT_SECONDS")? {
        config.neo4j.timeout_seconds = val;
    }

    // S3 writer overrides
    if let Some(val) = env_var("S3_WRITER", "BASE_URL") {
        config.s3_writer.base_url = val;
    }
    if let Some(val) = env_var("S3_WRITER", "HEALTH_URL") {
        config.s3_writer.health_url = Some(val);
    }
    if let Some(val) = parse_env("S3_WRITER", "MAX_RETRIES")? {
        config.s3_writer.retry.max_retries = val;
    }

    // Export overrides
    if let Some(val) = env_var("EXPORT", "CONCEPT_TYPES") {
        config.export.concept_types = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(val) = env_var("EXPORT", "API_BASE_URL") {
        config.export.api_base_url = val;
    }

    // Logging overrides
    if let Some(val) = parse_env("LOGGING", "LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env_var("LOGGING", "CONSOLE_FORMAT") {
        config.logging.console_format = val;
    }

    Ok(())
}
