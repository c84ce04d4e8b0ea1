use opentelemetry_semantic_conventions::{attribute::OTEL_STATUS_CODE, trace::ERROR_TYPE};
use rocket::http::Status;
use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::{Span, error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Uniqueness error: {0}")]
    Uniqueness(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn log_and_record(&self, ctx: &str) {
        let current_span = Span::current();
        let is_valid_span = !current_span.is_none();

        let message = self.to_string();
        let error_kind = self.kind();
        match self {
            AppError::Database(err) => {
                error!(error = %message, context = %ctx, db_error = %err, "Database error");
            }
            AppError::Validation(msg) => {
                warn!(message = %msg, context = %ctx, "Validation error");
            }
            AppError::Uniqueness(msg) => {
                warn!(message = %msg, context = %ctx, "Uniqueness error");
            }
            AppError::Integrity(msg) => {
                warn!(message = %msg, context = %ctx, "Integrity error");
            }
            AppError::NotFound(msg) => {
                warn!(message = %msg, context = %ctx, "Not found error");
            }
            AppError::Internal(msg) => {
                error!(message = %msg, context = %ctx, "Internal server error");
            }
        }

        if is_valid_span {
            current_span.record("error", tracing::field::display(true));
            current_span.record(ERROR_TYPE, tracing::field::display(error_kind));
            current_span.record("error.message", tracing::field::display(&message));

            if matches!(self, AppError::Database(_) | AppError::Internal(_)) {
                current_span.record(OTEL_STATUS_CODE, tracing::field::display("ERROR"));
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Validation(_) => "validation_error",
            AppError::Uniqueness(_) => "uniqueness_error",
            AppError::Integrity(_) => "integrity_error",
            AppError::NotFound(_) => "not_found_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> Status {
        match self {
            AppError::Database(_) => Status::InternalServerError,
            AppError::Validation(_) => Status::UnprocessableEntity,
            AppError::Uniqueness(_) => Status::Conflict,
            AppError::Integrity(_) => Status::Conflict,
            AppError::NotFound(_) => Status::NotFound,
            AppError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn to_status_with_log(&self, context: &str) -> Status {
        self.log_and_record(context);
        self.status_code()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = error {
            return AppError::NotFound("Record not found".to_string());
        }

        let kind = error.as_database_error().map(|db_err| db_err.kind());
        match kind {
            // SQLite reports e.g. "UNIQUE constraint failed: teams.name"
            Some(ErrorKind::UniqueViolation) => AppError::Uniqueness(
                error
                    .as_database_error()
                    .map(|db_err| db_err.message().to_string())
                    .unwrap_or_default(),
            ),
            Some(ErrorKind::ForeignKeyViolation) => AppError::Integrity(
                error
                    .as_database_error()
                    .map(|db_err| db_err.message().to_string())
                    .unwrap_or_default(),
            ),
            Some(ErrorKind::CheckViolation) | Some(ErrorKind::NotNullViolation) => {
                AppError::Validation(
                    error
                        .as_database_error()
                        .map(|db_err| db_err.message().to_string())
                        .unwrap_or_default(),
                )
            }
            _ => AppError::Database(error),
        }
    }
}

impl<'r> rocket::response::Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        self.to_status_with_log(&format!("Request to {} {}", req.method(), req.uri()))
            .respond_to(req)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        AppError::Internal(format!("Migration error: {}", error))
    }
}

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        err.to_status_with_log("Error conversion into Status")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_becomes_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.status_code(), Status::NotFound);
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::Validation("start_date is required".into()).status_code(),
            Status::UnprocessableEntity
        );
        assert_eq!(
            AppError::Uniqueness("UNIQUE constraint failed: teams.name".into()).status_code(),
            Status::Conflict
        );
        assert_eq!(
            AppError::Integrity("FOREIGN KEY constraint failed".into()).status_code(),
            Status::Conflict
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            Status::InternalServerError
        );
    }
}
