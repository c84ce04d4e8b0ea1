//! Filtered match reports: which matches fall inside a team/venue/date
//! window, and the duration and attendance averages over exactly those
//! matches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, QueryBuilder, Sqlite};
use thiserror::Error;
use tracing::{info, instrument};

use crate::db::{MATCH_SELECT, get_all_teams, get_all_venues};
use crate::error::AppError;
use crate::models::{Choice, DbMatch, Match};
use crate::validation::parse_date;

pub const ALL: &str = "all";
// Sentinel used by the report form's choice lists.
const LEGACY_ALL: &str = "-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    All,
    Only(i64),
}

impl Selection {
    fn parse(field: &'static str, raw: Option<&str>) -> Result<Self, FilterError> {
        let value = match raw.map(str::trim) {
            None | Some("") => return Ok(Selection::All),
            Some(value) => value,
        };

        if value.eq_ignore_ascii_case(ALL) || value == LEGACY_ALL {
            return Ok(Selection::All);
        }

        match value.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Selection::Only(id)),
            _ => Err(FilterError::InvalidSelection {
                field,
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be a date formatted as YYYY-MM-DD, got '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("{field} must be 'all' or a positive id, got '{value}'")]
    InvalidSelection { field: &'static str, value: String },
}

impl FilterError {
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::Missing(field) => field,
            FilterError::InvalidDate { field, .. } => field,
            FilterError::InvalidSelection { field, .. } => field,
        }
    }
}

impl From<FilterError> for AppError {
    fn from(error: FilterError) -> Self {
        AppError::Validation(error.to_string())
    }
}

/// Raw filter input as collected from a query string or the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    pub team: Option<String>,
    pub venue: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub team: Selection,
    pub venue: Selection,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TryFrom<&ReportQuery> for ReportFilter {
    type Error = FilterError;

    fn try_from(query: &ReportQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            team: Selection::parse("team", query.team.as_deref())?,
            venue: Selection::parse("venue", query.venue.as_deref())?,
            start_date: required_date("start_date", query.start_date.as_deref())?,
            end_date: required_date("end_date", query.end_date.as_deref())?,
        })
    }
}

fn required_date(field: &'static str, raw: Option<&str>) -> Result<NaiveDate, FilterError> {
    let value = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(FilterError::Missing(field))?;

    parse_date(value).ok_or_else(|| FilterError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub average_duration: f64,
    pub average_invited: f64,
    pub average_accepted: f64,
    pub average_attendance: f64,
}

impl Statistics {
    pub fn from_matches(matches: &[Match]) -> Self {
        let count = matches.len() as f64;
        // Stored values may be anywhere in i64, so sums are widened.
        let (duration, invited, accepted) =
            matches.iter().fold((0i128, 0i128, 0i128), |(d, i, a), m| {
                (
                    d + i128::from(m.duration),
                    i + i128::from(m.invited_count),
                    a + i128::from(m.accepted_count),
                )
            });

        let [
            average_duration,
            average_invited,
            average_accepted,
            average_attendance,
        ] = guarded_ratios([
            (duration as f64, count),
            (invited as f64, count),
            (accepted as f64, count),
            (accepted as f64 * 100.0, invited as f64),
        ]);

        Self {
            average_duration,
            average_invited,
            average_accepted,
            average_attendance,
        }
    }
}

/// Divides each pair, yielding 0 wherever the denominator is 0, and rounds
/// to two decimal places with ties going to the even digit.
pub fn guarded_ratios<const N: usize>(pairs: [(f64, f64); N]) -> [f64; N] {
    pairs.map(|(numerator, denominator)| {
        if denominator == 0.0 {
            0.0
        } else {
            round2(numerator / denominator)
        }
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub filter: ReportFilter,
    pub matches: Vec<Match>,
    pub statistics: Statistics,
}

/// Matches inside the filter window, ordered by date, time and id, together
/// with statistics computed over that same list.
#[instrument(skip(pool))]
pub async fn generate_report(pool: &Pool<Sqlite>, filter: &ReportFilter) -> Result<Report, AppError> {
    info!("Generating match report");

    let mut query = QueryBuilder::<Sqlite>::new(MATCH_SELECT);
    query
        .push(" WHERE m.date >= ")
        .push_bind(filter.start_date)
        .push(" AND m.date <= ")
        .push_bind(filter.end_date);

    if let Selection::Only(team_id) = filter.team {
        query.push(" AND m.team_id = ").push_bind(team_id);
    }
    if let Selection::Only(venue_id) = filter.venue {
        query.push(" AND m.venue_id = ").push_bind(venue_id);
    }

    query.push(" ORDER BY m.date, m.time, m.id");

    let rows = query.build_query_as::<DbMatch>().fetch_all(pool).await?;
    let matches: Vec<Match> = rows.into_iter().map(Match::from).collect();
    let statistics = Statistics::from_matches(&matches);

    info!(match_count = matches.len(), "Report generated");

    Ok(Report {
        filter: *filter,
        matches,
        statistics,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    pub teams: Vec<Choice>,
    pub venues: Vec<Choice>,
}

/// Choices for the report form: an "all" entry followed by every record.
#[instrument(skip(pool))]
pub async fn report_options(pool: &Pool<Sqlite>) -> Result<ReportOptions, AppError> {
    let all = |label: &str| Choice {
        value: ALL.to_string(),
        label: label.to_string(),
    };

    let mut teams = vec![all("All Teams")];
    teams.extend(get_all_teams(pool).await?.into_iter().map(|t| Choice {
        value: t.id.to_string(),
        label: t.name,
    }));

    let mut venues = vec![all("All Venues")];
    venues.extend(get_all_venues(pool).await?.into_iter().map(|v| Choice {
        value: v.id.to_string(),
        label: v.name,
    }));

    Ok(ReportOptions { teams, venues })
}
