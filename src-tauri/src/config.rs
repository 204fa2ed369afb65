//! Runtime configuration read from the environment (and `.env` via dotenvy)

use std::env;

pub const DEFAULT_DB_FILE: &str = "coach-desk.db";
pub const DEFAULT_LOG_FILTER: &str = "info";

const DB_FILE_VAR: &str = "COACH_DB_FILE";
const LOG_FILTER_VAR: &str = "COACH_LOG";
const SEED_DEFAULTS_VAR: &str = "COACH_SEED_DEFAULTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
  /// SQLite file name inside the app data directory
  pub db_file: String,
  /// tracing-subscriber EnvFilter directive
  pub log_filter: String,
  /// Fill an empty store with the default dataset on startup
  pub seed_defaults: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      db_file: DEFAULT_DB_FILE.to_string(),
      log_filter: DEFAULT_LOG_FILTER.to_string(),
      seed_defaults: true,
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {name}: {value:?}")]
  Invalid { name: &'static str, value: String },
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let db_file = match env::var(DB_FILE_VAR) {
      Ok(value) => validate_db_file(value)?,
      Err(_) => defaults.db_file,
    };

    let log_filter = env::var(LOG_FILTER_VAR)
      .ok()
      .filter(|v| !v.trim().is_empty())
      .unwrap_or(defaults.log_filter);

    let seed_defaults = match env::var(SEED_DEFAULTS_VAR) {
      Ok(value) => parse_bool(SEED_DEFAULTS_VAR, &value)?,
      Err(_) => defaults.seed_defaults,
    };

    Ok(Self {
      db_file,
      log_filter,
      seed_defaults,
    })
  }
}

fn validate_db_file(value: String) -> Result<String, ConfigError> {
  let trimmed = value.trim();
  if trimmed.is_empty() || trimmed.contains('/') || trimmed.contains('\\') {
    return Err(ConfigError::Invalid {
      name: DB_FILE_VAR,
      value,
    });
  }
  Ok(trimmed.to_string())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" => Ok(true),
    "false" | "0" | "no" => Ok(false),
    _ => Err(ConfigError::Invalid {
      name,
      value: value.to_string(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn test_defaults_when_unset() {
    temp_env::with_vars_unset([DB_FILE_VAR, LOG_FILTER_VAR, SEED_DEFAULTS_VAR], || {
      let config = AppConfig::from_env().expect("defaults should load");
      assert_eq!(config, AppConfig::default());
    });
  }

  #[test]
  #[serial]
  fn test_reads_overrides() {
    temp_env::with_vars(
      [
        (DB_FILE_VAR, Some("team.db")),
        (LOG_FILTER_VAR, Some("debug")),
        (SEED_DEFAULTS_VAR, Some("0")),
      ],
      || {
        let config = AppConfig::from_env().expect("overrides should load");
        assert_eq!(config.db_file, "team.db");
        assert_eq!(config.log_filter, "debug");
        assert!(!config.seed_defaults);
      },
    );
  }

  #[test]
  #[serial]
  fn test_rejects_bad_seed_flag() {
    temp_env::with_var(SEED_DEFAULTS_VAR, Some("sometimes"), || {
      let err = AppConfig::from_env().unwrap_err();
      assert!(err.to_string().contains(SEED_DEFAULTS_VAR));
    });
  }

  #[test]
  #[serial]
  fn test_rejects_db_path_with_directories() {
    temp_env::with_var(DB_FILE_VAR, Some("../elsewhere.db"), || {
      assert!(AppConfig::from_env().is_err());
    });
    temp_env::with_var(DB_FILE_VAR, Some("   "), || {
      assert!(AppConfig::from_env().is_err());
    });
  }

  #[test]
  #[serial]
  fn test_blank_log_filter_falls_back() {
    temp_env::with_var(LOG_FILTER_VAR, Some(""), || {
      let config = AppConfig::from_env().unwrap();
      assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    });
  }
}
