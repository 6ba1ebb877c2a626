use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Engine defaults injected into option structs when the caller does not
/// override them per request.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Candidates scoring below this are dropped (0-100).
    pub min_compatibility_score: i64,
    pub max_results: usize,
    pub max_alternatives: usize,
    /// Required margin on every internal axis for geometric eligibility.
    pub clearance_buffer: f64,
    /// TTL for the case-catalog read cache.
    pub catalog_cache_ttl_secs: u64,
    /// Bounded fan-out width for the batch matching path.
    pub batch_workers: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub batch_workers: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    database: RawDatabase,
    #[serde(default)]
    logging: RawLogging,
    #[serde(default)]
    engine: RawEngine,
}

#[derive(Debug, Default, Deserialize)]
struct RawDatabase {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEngine {
    min_compatibility_score: Option<i64>,
    max_results: Option<usize>,
    max_alternatives: Option<usize>,
    clearance_buffer: Option<f64>,
    catalog_cache_ttl_secs: Option<u64>,
    batch_workers: Option<usize>,
}

const DEFAULT_DATABASE_URL: &str = "sqlite://casefit.db";
const DEFAULT_CONFIG_FILE: &str = "casefit.toml";

impl AppConfig {
    /// Layered load: built-in defaults, then the TOML file (if present),
    /// then `CASEFIT_*` environment variables, then programmatic overrides.
    pub fn load(options: LoadOptions) -> Result<AppConfig, ConfigError> {
        let path = options.config_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let raw = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str::<RawConfig>(&contents)
                .map_err(|source| ConfigError::ParseFile { path: path.clone(), source })?,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                if options.require_file {
                    return Err(ConfigError::MissingConfigFile(path));
                }
                RawConfig::default()
            }
            Err(source) => return Err(ConfigError::ReadFile { path, source }),
        };

        let mut config = AppConfig::from_raw(raw);
        config.apply_env()?;
        config.apply_overrides(&options.overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_raw(raw: RawConfig) -> AppConfig {
        AppConfig {
            database: DatabaseConfig {
                url: raw.database.url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
                max_connections: raw.database.max_connections.unwrap_or(5),
                timeout_secs: raw.database.timeout_secs.unwrap_or(30),
            },
            logging: LoggingConfig {
                level: raw.logging.level.unwrap_or_else(|| "info".to_owned()),
                format: raw.logging.format.unwrap_or(LogFormat::Compact),
            },
            engine: EngineConfig {
                min_compatibility_score: raw.engine.min_compatibility_score.unwrap_or(70),
                max_results: raw.engine.max_results.unwrap_or(20),
                max_alternatives: raw.engine.max_alternatives.unwrap_or(5),
                clearance_buffer: raw.engine.clearance_buffer.unwrap_or(0.5),
                catalog_cache_ttl_secs: raw.engine.catalog_cache_ttl_secs.unwrap_or(60),
                batch_workers: raw.engine.batch_workers.unwrap_or(4),
            },
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = env::var("CASEFIT_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(level) = env::var("CASEFIT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("CASEFIT_LOG_FORMAT") {
            self.logging.format = match format.as_str() {
                "compact" => LogFormat::Compact,
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                other => {
                    return Err(ConfigError::InvalidEnvOverride {
                        key: "CASEFIT_LOG_FORMAT".to_owned(),
                        value: other.to_owned(),
                    })
                }
            };
        }
        if let Ok(workers) = env::var("CASEFIT_BATCH_WORKERS") {
            self.engine.batch_workers = workers.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "CASEFIT_BATCH_WORKERS".to_owned(),
                    value: workers.clone(),
                }
            })?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.database_url {
            self.database.url = url.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        if let Some(workers) = overrides.batch_workers {
            self.engine.batch_workers = workers;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Validation("database.url must not be empty".to_owned()));
        }
        if !(0..=100).contains(&self.engine.min_compatibility_score) {
            return Err(ConfigError::Validation(
                "engine.min_compatibility_score must be within 0-100".to_owned(),
            ));
        }
        if self.engine.clearance_buffer < 0.0 {
            return Err(ConfigError::Validation(
                "engine.clearance_buffer must not be negative".to_owned(),
            ));
        }
        if self.engine.batch_workers == 0 {
            return Err(ConfigError::Validation(
                "engine.batch_workers must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_when_no_file_present() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/casefit.toml")),
            ..LoadOptions::default()
        };
        let config = AppConfig::load(options).expect("load defaults");

        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.engine.min_compatibility_score, 70);
        assert_eq!(config.engine.max_results, 20);
        assert_eq!(config.engine.clearance_buffer, 0.5);
    }

    #[test]
    fn missing_required_file_errors() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/casefit.toml")),
            require_file: true,
            ..LoadOptions::default()
        };

        assert!(matches!(AppConfig::load(options), Err(ConfigError::MissingConfigFile(_))));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[database]\nurl = \"sqlite://custom.db\"\n\n[engine]\nmax_results = 10\nbatch_workers = 8\n"
        )
        .expect("write config");

        let options = LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            ..LoadOptions::default()
        };
        let config = AppConfig::load(options).expect("load file");

        assert_eq!(config.database.url, "sqlite://custom.db");
        assert_eq!(config.engine.max_results, 10);
        assert_eq!(config.engine.batch_workers, 8);
        // untouched sections keep defaults
        assert_eq!(config.engine.max_alternatives, 5);
    }

    #[test]
    fn programmatic_overrides_win() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/casefit.toml")),
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_owned()),
                log_level: Some("debug".to_owned()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        };
        let config = AppConfig::load(options).expect("load with overrides");

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn zero_batch_workers_rejected() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/casefit.toml")),
            overrides: ConfigOverrides { batch_workers: Some(0), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        };

        assert!(matches!(AppConfig::load(options), Err(ConfigError::Validation(_))));
    }
}
