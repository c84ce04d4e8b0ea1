//! Match report from the command line.
//!
//! ```text
//! report --team all --venue 2 --start 2024-01-01 --end 2024-12-31
//! ```

use std::fmt::Write as _;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use sports_team_tracker::config::{DEFAULT_DATABASE_URL, load_environment};
use sports_team_tracker::connect_database;
use sports_team_tracker::error::AppError;
use sports_team_tracker::report::{Report, ReportFilter, ReportQuery, generate_report};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "report")]
#[command(about = "Summarise matches by team, venue and date range", long_about = None)]
struct Cli {
    /// Team id, or "all"
    #[arg(long, default_value = "all")]
    team: String,

    /// Venue id, or "all"
    #[arg(long, default_value = "all")]
    venue: String,

    /// First day included in the report (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Last day included in the report (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Table,
}

impl Cli {
    fn query(&self) -> ReportQuery {
        ReportQuery {
            team: Some(self.team.clone()),
            venue: Some(self.venue.clone()),
            start_date: self.start.clone(),
            end_date: self.end.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = load_environment() {
        error!("Failed to load environment: {}", e);
    }

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(AppError::Validation(msg)) => {
            eprintln!("error: {}", msg);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<String, AppError> {
    // Validate before opening the database
    let filter = ReportFilter::try_from(&cli.query())?;

    let pool = connect_database(&cli.database_url).await?;
    let report = generate_report(&pool, &filter).await?;

    match cli.format {
        Format::Json => serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Internal(format!("Failed to serialise report: {}", e))),
        Format::Table => render_table(&report)
            .map_err(|e| AppError::Internal(format!("Failed to render report: {}", e))),
    }
}

fn render_table(report: &Report) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(
        out,
        "{:<10}  {:<5}  {:<20}  {:<20}  {:<20}  {:>8}  {:>7}  {:>8}",
        "date", "time", "team", "opponent", "venue", "minutes", "invited", "accepted"
    )?;
    for m in &report.matches {
        writeln!(
            out,
            "{:<10}  {:<5}  {:<20}  {:<20}  {:<20}  {:>8}  {:>7}  {:>8}",
            m.date.format("%Y-%m-%d"),
            m.time.format("%H:%M"),
            m.team_name,
            m.opponent,
            m.venue_name,
            m.duration,
            m.invited_count,
            m.accepted_count
        )?;
    }

    let stats = &report.statistics;
    writeln!(out)?;
    writeln!(out, "matches:            {}", report.matches.len())?;
    writeln!(out, "average duration:   {:.2}", stats.average_duration)?;
    writeln!(out, "average invited:    {:.2}", stats.average_invited)?;
    writeln!(out, "average accepted:   {:.2}", stats.average_accepted)?;
    write!(out, "average attendance: {:.2}%", stats.average_attendance)?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sports_team_tracker::report::{Selection, Statistics};

    #[test]
    fn parses_report_arguments() {
        let cli = Cli::parse_from([
            "report",
            "--team=3",
            "--start=2024-01-01",
            "--end=2024-12-31",
            "--database-url=sqlite::memory:",
        ]);
        let filter = ReportFilter::try_from(&cli.query()).unwrap();
        assert_eq!(filter.team, Selection::Only(3));
        assert_eq!(filter.venue, Selection::All);
        assert_eq!(cli.format, Format::Table);
    }

    #[tokio::test]
    async fn missing_dates_fail_before_touching_the_store() {
        let cli = Cli::parse_from([
            "report",
            "--start=2024-01-01",
            "--database-url=sqlite:///nonexistent/dir/never.db",
        ]);
        let err = run(&cli).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn table_lists_statistics() {
        let report = Report {
            filter: ReportFilter {
                team: Selection::All,
                venue: Selection::All,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            },
            matches: vec![],
            statistics: Statistics {
                average_attendance: 66.67,
                ..Statistics::default()
            },
        };

        let table = render_table(&report).unwrap();
        assert!(table.contains("matches:            0"));
        assert!(table.ends_with("average attendance: 66.67%"));
    }
}
