use rocket::http::Status;
use rocket::response::Redirect;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Request, State};
use sqlx::{Pool, Sqlite};

use crate::db::{
    create_match, create_player, create_team, create_venue, delete_match, delete_player,
    delete_team, delete_venue, get_all_matches, get_all_players, get_all_teams, get_all_venues,
    get_match, get_player, get_team, get_venue, update_match, update_player, update_team,
    update_venue,
};
use crate::models::{Match, MatchInput, Player, PlayerInput, Team, TeamInput, Venue, VenueInput};
use crate::report::{Report, ReportFilter, ReportOptions, ReportQuery, generate_report, report_options};
use crate::validation::{
    ApiError, AppErrorExt, JsonValidateExt, ToValidationResponse, ValidationResponse,
};

type Created<T> = Custom<Json<T>>;

#[get("/")]
pub fn index() -> Redirect {
    Redirect::to("/api/teams")
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

#[catch(default)]
pub fn json_catcher(status: Status, _req: &Request) -> ApiError {
    status.to_validation_response()
}

// Teams

#[get("/teams")]
pub async fn api_list_teams(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Team>>, ApiError> {
    let teams = get_all_teams(db).await.validate_custom()?;
    Ok(Json(teams))
}

#[get("/teams/<id>")]
pub async fn api_get_team(id: i64, db: &State<Pool<Sqlite>>) -> Result<Json<Team>, ApiError> {
    let team = get_team(db, id).await.validate_custom()?;
    Ok(Json(team))
}

#[post("/teams", data = "<team>")]
pub async fn api_create_team(
    team: Json<TeamInput>,
    db: &State<Pool<Sqlite>>,
) -> Result<Created<Team>, ApiError> {
    let validated = team.validate_custom()?;
    let created = create_team(db, &validated).await.validate_custom()?;
    Ok(Custom(Status::Created, Json(created)))
}

#[put("/teams/<id>", data = "<team>")]
pub async fn api_update_team(
    id: i64,
    team: Json<TeamInput>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Team>, ApiError> {
    let validated = team.validate_custom()?;
    let updated = update_team(db, id, &validated).await.validate_custom()?;
    Ok(Json(updated))
}

#[delete("/teams/<id>")]
pub async fn api_delete_team(id: i64, db: &State<Pool<Sqlite>>) -> Result<Status, ApiError> {
    delete_team(db, id).await.validate_custom()?;
    Ok(Status::Ok)
}

// Players

#[get("/players?<team_id>")]
pub async fn api_list_players(
    team_id: Option<i64>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let players = get_all_players(db, team_id).await.validate_custom()?;
    Ok(Json(players))
}

#[get("/players/<id>")]
pub async fn api_get_player(id: i64, db: &State<Pool<Sqlite>>) -> Result<Json<Player>, ApiError> {
    let player = get_player(db, id).await.validate_custom()?;
    Ok(Json(player))
}

#[post("/players", data = "<player>")]
pub async fn api_create_player(
    player: Json<PlayerInput>,
    db: &State<Pool<Sqlite>>,
) -> Result<Created<Player>, ApiError> {
    let validated = player.validate_custom()?;
    let created = create_player(db, &validated).await.validate_custom()?;
    Ok(Custom(Status::Created, Json(created)))
}

#[put("/players/<id>", data = "<player>")]
pub async fn api_update_player(
    id: i64,
    player: Json<PlayerInput>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Player>, ApiError> {
    let validated = player.validate_custom()?;
    let updated = update_player(db, id, &validated).await.validate_custom()?;
    Ok(Json(updated))
}

#[delete("/players/<id>")]
pub async fn api_delete_player(id: i64, db: &State<Pool<Sqlite>>) -> Result<Status, ApiError> {
    delete_player(db, id).await.validate_custom()?;
    Ok(Status::Ok)
}

// Venues

#[get("/venues")]
pub async fn api_list_venues(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Venue>>, ApiError> {
    let venues = get_all_venues(db).await.validate_custom()?;
    Ok(Json(venues))
}

#[get("/venues/<id>")]
pub async fn api_get_venue(id: i64, db: &State<Pool<Sqlite>>) -> Result<Json<Venue>, ApiError> {
    let venue = get_venue(db, id).await.validate_custom()?;
    Ok(Json(venue))
}

#[post("/venues", data = "<venue>")]
pub async fn api_create_venue(
    venue: Json<VenueInput>,
    db: &State<Pool<Sqlite>>,
) -> Result<Created<Venue>, ApiError> {
    let validated = venue.validate_custom()?;
    let created = create_venue(db, &validated).await.validate_custom()?;
    Ok(Custom(Status::Created, Json(created)))
}

#[put("/venues/<id>", data = "<venue>")]
pub async fn api_update_venue(
    id: i64,
    venue: Json<VenueInput>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Venue>, ApiError> {
    let validated = venue.validate_custom()?;
    let updated = update_venue(db, id, &validated).await.validate_custom()?;
    Ok(Json(updated))
}

#[delete("/venues/<id>")]
pub async fn api_delete_venue(id: i64, db: &State<Pool<Sqlite>>) -> Result<Status, ApiError> {
    delete_venue(db, id).await.validate_custom()?;
    Ok(Status::Ok)
}

// Matches

#[get("/matches")]
pub async fn api_list_matches(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Match>>, ApiError> {
    let matches = get_all_matches(db).await.validate_custom()?;
    Ok(Json(matches))
}

#[get("/matches/<id>")]
pub async fn api_get_match(id: i64, db: &State<Pool<Sqlite>>) -> Result<Json<Match>, ApiError> {
    let game = get_match(db, id).await.validate_custom()?;
    Ok(Json(game))
}

#[post("/matches", data = "<game>")]
pub async fn api_create_match(
    game: Json<MatchInput>,
    db: &State<Pool<Sqlite>>,
) -> Result<Created<Match>, ApiError> {
    let validated = game.validate_custom()?;
    let created = create_match(db, &validated).await.validate_custom()?;
    Ok(Custom(Status::Created, Json(created)))
}

#[put("/matches/<id>", data = "<game>")]
pub async fn api_update_match(
    id: i64,
    game: Json<MatchInput>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Match>, ApiError> {
    let validated = game.validate_custom()?;
    let updated = update_match(db, id, &validated).await.validate_custom()?;
    Ok(Json(updated))
}

#[delete("/matches/<id>")]
pub async fn api_delete_match(id: i64, db: &State<Pool<Sqlite>>) -> Result<Status, ApiError> {
    delete_match(db, id).await.validate_custom()?;
    Ok(Status::Ok)
}

// Report

#[get("/report?<team>&<venue>&<start_date>&<end_date>")]
pub async fn api_report(
    team: Option<String>,
    venue: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Report>, ApiError> {
    let query = ReportQuery {
        team,
        venue,
        start_date,
        end_date,
    };

    let filter = ReportFilter::try_from(&query).map_err(|e| {
        tracing::warn!(field = e.field(), error = %e, "Rejected report filter");
        Custom(
            Status::UnprocessableEntity,
            Json(ValidationResponse::with_error(e.field(), &e.to_string())),
        )
    })?;

    let report = generate_report(db, &filter).await.validate_custom()?;
    Ok(Json(report))
}

#[get("/report/options")]
pub async fn api_report_options(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ReportOptions>, ApiError> {
    let options = report_options(db).await.validate_custom()?;
    Ok(Json(options))
}
