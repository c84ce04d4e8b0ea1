use std::path::Path;

use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://sports_team.db?mode=rwc";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub profile: String,
    pub otlp_endpoint: Option<String>,
    pub honeycomb_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: non_empty_var("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            profile: non_empty_var("ROCKET_PROFILE").unwrap_or_else(|| "development".to_string()),
            otlp_endpoint: non_empty_var("OTEL_EXPORTER_OTLP_ENDPOINT"),
            honeycomb_api_key: non_empty_var("HONEYCOMB_API_KEY"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.profile == "production"
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    dotenvy::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub fn load_environment() -> Result<(), Box<dyn std::error::Error>> {
    for env_file in env_files(&AppConfig::from_env()) {
        load_env_file(env_file)?;
    }

    Ok(())
}

/// Env files in load order; later files override earlier ones.
fn env_files(config: &AppConfig) -> [&'static str; 3] {
    if config.is_production() {
        ["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        ["config/common.env", "config/dev.env", ".secrets.env"]
    }
}

fn load_env_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_when_nothing_is_set() {
        temp_env::with_vars_unset(
            [
                "DATABASE_URL",
                "ROCKET_PROFILE",
                "OTEL_EXPORTER_OTLP_ENDPOINT",
                "HONEYCOMB_API_KEY",
            ],
            || {
                let config = AppConfig::from_env();
                assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
                assert_eq!(config.profile, "development");
                assert!(!config.is_production());
                assert!(config.otlp_endpoint.is_none());
                assert!(config.honeycomb_api_key.is_none());
            },
        );
    }

    #[test]
    #[serial]
    fn reads_values_from_environment() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("sqlite::memory:")),
                ("ROCKET_PROFILE", Some("production")),
                ("OTEL_EXPORTER_OTLP_ENDPOINT", Some("http://localhost:4317")),
                ("HONEYCOMB_API_KEY", Some("")),
            ],
            || {
                let config = AppConfig::from_env();
                assert_eq!(config.database_url, "sqlite::memory:");
                assert!(config.is_production());
                assert_eq!(
                    config.otlp_endpoint.as_deref(),
                    Some("http://localhost:4317")
                );
                // blank values count as unset
                assert!(config.honeycomb_api_key.is_none());
            },
        );
    }

    #[test]
    #[serial]
    fn profile_selects_env_files() {
        temp_env::with_var("ROCKET_PROFILE", Some("production"), || {
            assert_eq!(env_files(&AppConfig::from_env())[1], "config/prod.env");
        });
        temp_env::with_var_unset("ROCKET_PROFILE", || {
            assert_eq!(
                env_files(&AppConfig::from_env()),
                ["config/common.env", "config/dev.env", ".secrets.env"]
            );
        });
    }

    #[test]
    #[serial]
    fn missing_env_files_are_skipped() {
        assert!(load_env_file("config/does-not-exist.env").is_ok());
    }
}
