use crate::error::AppError;
use crate::models::{
    DbMatch, DbPlayer, DbTeam, DbVenue, Match, MatchInput, Player, PlayerInput, Team, TeamInput,
    Venue, VenueInput,
};
use crate::validation::InputCheck;
use sqlx::{Pool, Sqlite, SqliteConnection, Transaction};
use tracing::{info, instrument};

pub const MATCH_SELECT: &str = "SELECT m.id, m.date, m.time, m.duration, m.description,
            m.team_id, t.name AS team_name, m.opponent,
            m.venue_id, v.name AS venue_name,
            m.invited_count, m.accepted_count
     FROM matches m
     JOIN teams t ON t.id = m.team_id
     JOIN venues v ON v.id = m.venue_id";

const PLAYER_SELECT: &str = "SELECT p.id, p.name, p.email, p.team_id, t.name AS team_name
     FROM players p
     JOIN teams t ON t.id = p.team_id";

/// Commits on success and rolls back on failure, so a failed write never
/// leaves partial changes behind.
async fn finish<T>(
    tx: Transaction<'_, Sqlite>,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

fn ensure_affected(rows_affected: u64, entity: &str, id: i64) -> Result<(), AppError> {
    if rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "{} with id {} not found in database",
            entity, id
        )));
    }
    Ok(())
}

// Teams

#[instrument(skip(pool))]
pub async fn get_all_teams(pool: &Pool<Sqlite>) -> Result<Vec<Team>, AppError> {
    info!("Getting all teams");
    let rows = sqlx::query_as::<_, DbTeam>(
        "SELECT id, name, coach, founded_year FROM teams ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Team::from).collect())
}

async fn fetch_team(conn: &mut SqliteConnection, id: i64) -> Result<Team, AppError> {
    let row = sqlx::query_as::<_, DbTeam>(
        "SELECT id, name, coach, founded_year FROM teams WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(team) => Ok(Team::from(team)),
        _ => Err(AppError::NotFound(format!(
            "Team with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn get_team(pool: &Pool<Sqlite>, id: i64) -> Result<Team, AppError> {
    info!("Fetching team by ID");
    let mut conn = pool.acquire().await?;
    fetch_team(&mut conn, id).await
}

#[instrument(skip(pool))]
pub async fn create_team(pool: &Pool<Sqlite>, input: &TeamInput) -> Result<Team, AppError> {
    info!("Creating team");
    input.check()?;

    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query("INSERT INTO teams (name, coach, founded_year) VALUES (?, ?, ?)")
            .bind(input.name.trim())
            .bind(input.coach.trim())
            .bind(input.founded_year)
            .execute(&mut *tx)
            .await?;

        fetch_team(&mut tx, res.last_insert_rowid()).await
    }
    .await;

    finish(tx, result).await
}

#[instrument(skip(pool))]
pub async fn update_team(
    pool: &Pool<Sqlite>,
    id: i64,
    input: &TeamInput,
) -> Result<Team, AppError> {
    info!("Updating team");
    input.check()?;

    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query("UPDATE teams SET name = ?, coach = ?, founded_year = ? WHERE id = ?")
            .bind(input.name.trim())
            .bind(input.coach.trim())
            .bind(input.founded_year)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        ensure_affected(res.rows_affected(), "Team", id)?;

        fetch_team(&mut tx, id).await
    }
    .await;

    finish(tx, result).await
}

/// Removes the team together with its players and matches.
#[instrument(skip(pool))]
pub async fn delete_team(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting team");
    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        ensure_affected(res.rows_affected(), "Team", id)
    }
    .await;

    finish(tx, result).await
}

// Players

#[instrument(skip(pool))]
pub async fn get_all_players(
    pool: &Pool<Sqlite>,
    team_id: Option<i64>,
) -> Result<Vec<Player>, AppError> {
    info!("Getting players");
    let rows = match team_id {
        Some(team_id) => {
            sqlx::query_as::<_, DbPlayer>(&format!(
                "{} WHERE p.team_id = ? ORDER BY p.name, p.id",
                PLAYER_SELECT
            ))
            .bind(team_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, DbPlayer>(&format!("{} ORDER BY p.name, p.id", PLAYER_SELECT))
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows.into_iter().map(Player::from).collect())
}

async fn fetch_player(conn: &mut SqliteConnection, id: i64) -> Result<Player, AppError> {
    let row = sqlx::query_as::<_, DbPlayer>(&format!("{} WHERE p.id = ?", PLAYER_SELECT))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(player) => Ok(Player::from(player)),
        _ => Err(AppError::NotFound(format!(
            "Player with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn get_player(pool: &Pool<Sqlite>, id: i64) -> Result<Player, AppError> {
    info!("Fetching player by ID");
    let mut conn = pool.acquire().await?;
    fetch_player(&mut conn, id).await
}

#[instrument(skip(pool))]
pub async fn create_player(pool: &Pool<Sqlite>, input: &PlayerInput) -> Result<Player, AppError> {
    info!("Creating player");
    input.check()?;

    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query("INSERT INTO players (name, email, team_id) VALUES (?, ?, ?)")
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(input.team_id)
            .execute(&mut *tx)
            .await?;

        fetch_player(&mut tx, res.last_insert_rowid()).await
    }
    .await;

    finish(tx, result).await
}

#[instrument(skip(pool))]
pub async fn update_player(
    pool: &Pool<Sqlite>,
    id: i64,
    input: &PlayerInput,
) -> Result<Player, AppError> {
    info!("Updating player");
    input.check()?;

    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query("UPDATE players SET name = ?, email = ?, team_id = ? WHERE id = ?")
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(input.team_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        ensure_affected(res.rows_affected(), "Player", id)?;

        fetch_player(&mut tx, id).await
    }
    .await;

    finish(tx, result).await
}

#[instrument(skip(pool))]
pub async fn delete_player(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting player");
    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        ensure_affected(res.rows_affected(), "Player", id)
    }
    .await;

    finish(tx, result).await
}

// Venues

#[instrument(skip(pool))]
pub async fn get_all_venues(pool: &Pool<Sqlite>) -> Result<Vec<Venue>, AppError> {
    info!("Getting all venues");
    let rows = sqlx::query_as::<_, DbVenue>(
        "SELECT id, name, location, capacity FROM venues ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Venue::from).collect())
}

async fn fetch_venue(conn: &mut SqliteConnection, id: i64) -> Result<Venue, AppError> {
    let row =
        sqlx::query_as::<_, DbVenue>("SELECT id, name, location, capacity FROM venues WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    match row {
        Some(venue) => Ok(Venue::from(venue)),
        _ => Err(AppError::NotFound(format!(
            "Venue with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn get_venue(pool: &Pool<Sqlite>, id: i64) -> Result<Venue, AppError> {
    info!("Fetching venue by ID");
    let mut conn = pool.acquire().await?;
    fetch_venue(&mut conn, id).await
}

#[instrument(skip(pool))]
pub async fn create_venue(pool: &Pool<Sqlite>, input: &VenueInput) -> Result<Venue, AppError> {
    info!("Creating venue");
    input.check()?;

    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query("INSERT INTO venues (name, location, capacity) VALUES (?, ?, ?)")
            .bind(input.name.trim())
            .bind(input.location.trim())
            .bind(input.capacity)
            .execute(&mut *tx)
            .await?;

        fetch_venue(&mut tx, res.last_insert_rowid()).await
    }
    .await;

    finish(tx, result).await
}

#[instrument(skip(pool))]
pub async fn update_venue(
    pool: &Pool<Sqlite>,
    id: i64,
    input: &VenueInput,
) -> Result<Venue, AppError> {
    info!("Updating venue");
    input.check()?;

    let mut tx = pool.begin().await?;
    let result = async {
        let res =
            sqlx::query("UPDATE venues SET name = ?, location = ?, capacity = ? WHERE id = ?")
                .bind(input.name.trim())
                .bind(input.location.trim())
                .bind(input.capacity)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        ensure_affected(res.rows_affected(), "Venue", id)?;

        fetch_venue(&mut tx, id).await
    }
    .await;

    finish(tx, result).await
}

/// Removes the venue and every match played there.
#[instrument(skip(pool))]
pub async fn delete_venue(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting venue");
    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query("DELETE FROM venues WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        ensure_affected(res.rows_affected(), "Venue", id)
    }
    .await;

    finish(tx, result).await
}

// Matches

#[instrument(skip(pool))]
pub async fn get_all_matches(pool: &Pool<Sqlite>) -> Result<Vec<Match>, AppError> {
    info!("Getting all matches");
    let rows = sqlx::query_as::<_, DbMatch>(&format!(
        "{} ORDER BY m.date DESC, m.time DESC, m.id DESC",
        MATCH_SELECT
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Match::from).collect())
}

async fn fetch_match(conn: &mut SqliteConnection, id: i64) -> Result<Match, AppError> {
    let row = sqlx::query_as::<_, DbMatch>(&format!("{} WHERE m.id = ?", MATCH_SELECT))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(m) => Ok(Match::from(m)),
        _ => Err(AppError::NotFound(format!(
            "Match with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn get_match(pool: &Pool<Sqlite>, id: i64) -> Result<Match, AppError> {
    info!("Fetching match by ID");
    let mut conn = pool.acquire().await?;
    fetch_match(&mut conn, id).await
}

#[instrument(skip(pool))]
pub async fn create_match(pool: &Pool<Sqlite>, input: &MatchInput) -> Result<Match, AppError> {
    info!("Creating match");
    input.check()?;
    let (date, time) = input.schedule()?;

    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query(
            "INSERT INTO matches
             (date, time, duration, description, team_id, opponent, venue_id, invited_count, accepted_count)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(date)
        .bind(time)
        .bind(input.duration)
        .bind(input.description())
        .bind(input.team_id)
        .bind(input.opponent.trim())
        .bind(input.venue_id)
        .bind(input.invited_count)
        .bind(input.accepted_count)
        .execute(&mut *tx)
        .await?;

        fetch_match(&mut tx, res.last_insert_rowid()).await
    }
    .await;

    finish(tx, result).await
}

#[instrument(skip(pool))]
pub async fn update_match(
    pool: &Pool<Sqlite>,
    id: i64,
    input: &MatchInput,
) -> Result<Match, AppError> {
    info!("Updating match");
    input.check()?;
    let (date, time) = input.schedule()?;

    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query(
            "UPDATE matches
             SET date = ?, time = ?, duration = ?, description = ?, team_id = ?,
                 opponent = ?, venue_id = ?, invited_count = ?, accepted_count = ?
             WHERE id = ?",
        )
        .bind(date)
        .bind(time)
        .bind(input.duration)
        .bind(input.description())
        .bind(input.team_id)
        .bind(input.opponent.trim())
        .bind(input.venue_id)
        .bind(input.invited_count)
        .bind(input.accepted_count)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        ensure_affected(res.rows_affected(), "Match", id)?;

        fetch_match(&mut tx, id).await
    }
    .await;

    finish(tx, result).await
}

#[instrument(skip(pool))]
pub async fn delete_match(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting match");
    let mut tx = pool.begin().await?;
    let result = async {
        let res = sqlx::query("DELETE FROM matches WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        ensure_affected(res.rows_affected(), "Match", id)
    }
    .await;

    finish(tx, result).await
}
