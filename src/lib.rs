#[macro_use]
extern crate rocket;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod telemetry;
pub mod validation;
#[cfg(test)]
mod test;

use api::{
    api_create_match, api_create_player, api_create_team, api_create_venue, api_delete_match,
    api_delete_player, api_delete_team, api_delete_venue, api_get_match, api_get_player,
    api_get_team, api_get_venue, api_list_matches, api_list_players, api_list_teams,
    api_list_venues, api_report, api_report_options, api_update_match, api_update_player,
    api_update_team, api_update_venue, health, index, json_catcher,
};
use error::AppError;
use rocket::{Build, Rocket};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use telemetry::TelemetryFairing;
use tracing::info;

/// Opens the pool and brings the schema up to date.
pub async fn connect_database(database_url: &str) -> Result<SqlitePool, AppError> {
    let pool = SqlitePoolOptions::new().connect(database_url).await?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed successfully");

    Ok(pool)
}

pub fn init_rocket(pool: SqlitePool) -> Rocket<Build> {
    info!("Starting sports team tracker");

    rocket::build()
        .manage(pool)
        .mount("/", routes![index])
        .mount(
            "/api",
            routes![
                health,
                api_list_teams,
                api_get_team,
                api_create_team,
                api_update_team,
                api_delete_team,
                api_list_players,
                api_get_player,
                api_create_player,
                api_update_player,
                api_delete_player,
                api_list_venues,
                api_get_venue,
                api_create_venue,
                api_update_venue,
                api_delete_venue,
                api_list_matches,
                api_get_match,
                api_create_match,
                api_update_match,
                api_delete_match,
                api_report,
                api_report_options,
            ],
        )
        .register("/api", catchers![json_catcher])
        .attach(TelemetryFairing)
}
