use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;
use crate::validation::{InputCheck, not_blank, parse_date, parse_time, valid_date, valid_time};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub coach: String,
    pub founded_year: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTeam {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub coach: Option<String>,
    pub founded_year: Option<i64>,
}

impl From<DbTeam> for Team {
    fn from(team: DbTeam) -> Self {
        Self {
            id: team.id.unwrap_or_default(),
            name: team.name.unwrap_or_default(),
            coach: team.coach.unwrap_or_default(),
            founded_year: team.founded_year.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub team_id: i64,
    pub team_name: String, // Joined for listings
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbPlayer {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

impl From<DbPlayer> for Player {
    fn from(player: DbPlayer) -> Self {
        Self {
            id: player.id.unwrap_or_default(),
            name: player.name.unwrap_or_default(),
            email: player.email.unwrap_or_default(),
            team_id: player.team_id.unwrap_or_default(),
            team_name: player.team_name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub capacity: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbVenue {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i64>,
}

impl From<DbVenue> for Venue {
    fn from(venue: DbVenue) -> Self {
        Self {
            id: venue.id.unwrap_or_default(),
            name: venue.name.unwrap_or_default(),
            location: venue.location.unwrap_or_default(),
            capacity: venue.capacity.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: i64, // minutes
    pub description: Option<String>,
    pub team_id: i64,
    pub team_name: String,
    pub opponent: String,
    pub venue_id: i64,
    pub venue_name: String,
    pub invited_count: i64,
    pub accepted_count: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbMatch {
    pub id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration: Option<i64>,
    pub description: Option<String>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    pub opponent: Option<String>,
    pub venue_id: Option<i64>,
    pub venue_name: Option<String>,
    pub invited_count: Option<i64>,
    pub accepted_count: Option<i64>,
}

impl From<DbMatch> for Match {
    fn from(db: DbMatch) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            date: db.date.unwrap_or_default(),
            time: db.time.unwrap_or_default(),
            duration: db.duration.unwrap_or_default(),
            description: db.description.filter(|d| !d.is_empty()),
            team_id: db.team_id.unwrap_or_default(),
            team_name: db.team_name.unwrap_or_default(),
            opponent: db.opponent.unwrap_or_default(),
            venue_id: db.venue_id.unwrap_or_default(),
            venue_name: db.venue_name.unwrap_or_default(),
            invited_count: db.invited_count.unwrap_or_default(),
            accepted_count: db.accepted_count.unwrap_or_default(),
        }
    }
}

/// An id/name pair offered as a filter choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TeamInput {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub name: String,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub coach: String,
    #[validate(range(min = 1800, max = 2100, message = "must be between 1800 and 2100"))]
    pub founded_year: i64,
}

impl InputCheck for TeamInput {}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlayerInput {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"), length(max = 120))]
    pub email: String,
    #[validate(range(min = 1, message = "must reference a team"))]
    pub team_id: i64,
}

impl InputCheck for PlayerInput {}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VenueInput {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub name: String,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub location: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub capacity: i64,
}

impl InputCheck for VenueInput {}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchInput {
    #[validate(range(min = 1, message = "must reference a team"))]
    pub team_id: i64,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub opponent: String,
    #[validate(range(min = 1, message = "must reference a venue"))]
    pub venue_id: i64,
    #[validate(custom(function = "valid_date"))]
    pub date: String,
    #[validate(custom(function = "valid_time"))]
    pub time: String,
    #[validate(range(min = 1, message = "must be at least 1 minute"))]
    pub duration: i64,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub invited_count: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub accepted_count: i64,
}

impl MatchInput {
    /// Parsed date and time; only fails on input that skipped `check`.
    pub fn schedule(&self) -> Result<(NaiveDate, NaiveTime), AppError> {
        let date = parse_date(&self.date)
            .ok_or_else(|| AppError::Validation(format!("invalid date '{}'", self.date)))?;
        let time = parse_time(&self.time)
            .ok_or_else(|| AppError::Validation(format!("invalid time '{}'", self.time)))?;
        Ok((date, time))
    }

    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

impl InputCheck for MatchInput {
    fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if self.accepted_count > self.invited_count {
            errors.add(
                "accepted_count",
                ValidationError::new("accepted_exceeds_invited")
                    .with_message(Cow::from("must not exceed invited_count")),
            );
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
