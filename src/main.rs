use sports_team_tracker::config::{AppConfig, load_environment};
use sports_team_tracker::error::AppError;
use sports_team_tracker::telemetry::init_tracing;
use sports_team_tracker::{connect_database, init_rocket};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Environment(String),
    #[error("Rocket error: {0}")]
    Rocket(String),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

impl From<rocket::Error> for Error {
    fn from(value: rocket::Error) -> Self {
        Error::Rocket(value.to_string())
    }
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    load_environment().map_err(|e| Error::Environment(e.to_string()))?;
    let config = AppConfig::from_env();

    let _telemetry_guard = init_tracing(&config)?;
    info!(profile = %config.profile, "Configuration loaded");

    let pool = connect_database(&config.database_url).await?;

    let _rocket = init_rocket(pool).launch().await?;

    Ok(())
}
