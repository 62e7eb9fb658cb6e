use std::time::Duration;

use anyhow::{Context, Result};

use crate::autosave::{CompletionMode, DEFAULT_QUIET_PERIOD};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. Drafts are kept in memory when unset.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub autosave_quiet_period: Duration,
    pub autosave_mode: CompletionMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let autosave_quiet_period = match var("AUTOSAVE_DELAY_MS") {
            Some(ms) => Duration::from_millis(
                ms.parse::<u64>()
                    .context("AUTOSAVE_DELAY_MS must be a whole number of milliseconds")?,
            ),
            None => DEFAULT_QUIET_PERIOD,
        };

        let track_completion = match var("AUTOSAVE_TRACK_COMPLETION") {
            Some(flag) => flag
                .parse::<bool>()
                .context("AUTOSAVE_TRACK_COMPLETION must be 'true' or 'false'")?,
            None => false,
        };

        Ok(Config {
            database_url: var("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            autosave_quiet_period,
            autosave_mode: if track_completion {
                CompletionMode::AwaitSave
            } else {
                CompletionMode::GracePeriod
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.autosave_quiet_period, Duration::from_millis(2000));
        assert_eq!(config.autosave_mode, CompletionMode::GracePeriod);
    }

    #[test]
    fn test_autosave_overrides() {
        let config = config_from(&[
            ("AUTOSAVE_DELAY_MS", "750"),
            ("AUTOSAVE_TRACK_COMPLETION", "true"),
            ("DATABASE_URL", "postgres://localhost/cv"),
        ])
        .unwrap();
        assert_eq!(config.autosave_quiet_period, Duration::from_millis(750));
        assert_eq!(config.autosave_mode, CompletionMode::AwaitSave);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/cv")
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("AUTOSAVE_DELAY_MS", "-5")]).is_err());
        assert!(config_from(&[("AUTOSAVE_TRACK_COMPLETION", "yes")]).is_err());
    }

    #[test]
    fn test_blank_database_url_means_memory() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }
}
