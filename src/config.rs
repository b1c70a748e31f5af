use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

use crate::client::RetryPolicy;
use crate::error::Result;
use crate::utils::constants::{
    API_BASE_URL, DEFAULT_CHUNK_DAYS, DEFAULT_MAX_ATTEMPTS, DEFAULT_PAUSE_MS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_TIMEZONE, ENV_PREFIX,
};

/// Tunables for a download run.
///
/// Layered as compiled defaults, then an optional config file, then
/// `OPENMETEO_*` environment variables. Command-line flags are applied on
/// top by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(length(min = 1))]
    pub base_url: String,

    #[validate(length(min = 1))]
    pub timezone: String,

    #[validate(range(min = 1))]
    pub chunk_days: i64,

    #[validate(range(min = 1))]
    pub max_attempts: u32,

    pub retry_delay_ms: u64,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    pub pause_ms: u64,
}

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(file, Environment::with_prefix(ENV_PREFIX))
    }

    pub fn load_with_env(file: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("base_url", API_BASE_URL)?
            .set_default("timezone", DEFAULT_TIMEZONE)?
            .set_default("chunk_days", DEFAULT_CHUNK_DAYS)?
            .set_default("max_attempts", i64::from(DEFAULT_MAX_ATTEMPTS))?
            .set_default("retry_delay_ms", DEFAULT_RETRY_DELAY_MS as i64)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("pause_ms", DEFAULT_PAUSE_MS as i64)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            chunk_days: DEFAULT_CHUNK_DAYS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            pause_ms: DEFAULT_PAUSE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::Builder;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let settings = Settings::load_with_env(None, env(&[]))?;
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.retry_policy().max_attempts(), 3);
        assert_eq!(settings.pause(), Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn test_file_then_env_override() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "chunk_days = 90")?;
        writeln!(file, "timezone = \"UTC\"")?;
        writeln!(file, "max_attempts = 5")?;

        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[("OPENMETEO_MAX_ATTEMPTS", "7"), ("OPENMETEO_PAUSE_MS", "0")]),
        )?;

        assert_eq!(settings.chunk_days, 90);
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.max_attempts, 7);
        assert_eq!(settings.pause_ms, 0);
        assert_eq!(settings.base_url, API_BASE_URL);
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = Settings::load_with_env(None, env(&[("OPENMETEO_CHUNK_DAYS", "0")]));
        assert!(matches!(result, Err(FetchError::Validation(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Settings::load_with_env(Some(Path::new("missing-settings.toml")), env(&[]));
        assert!(matches!(result, Err(FetchError::Config(_))));
    }
}
