use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use residencia_config::ConfigError;
use residencia_database::DatabaseError;
use residencia_occupancy::OccupancyError;
use serde::Serialize;
use tracing::{error, warn};

use crate::mail::MailError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("password hash error: {0}")]
    PasswordHash(argon2::password_hash::Error),
    #[error("join error: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("mail error: {0}")]
    Mail(#[from] MailError),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("schedule error: {0}")]
    Schedule(#[from] cron::error::Error),
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for AppError {
    fn from(value: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        Self::Database(value.into())
    }
}

impl From<DieselError> for AppError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Conflict(format!("duplicate value: {}", info.message()))
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::Conflict(format!(
                    "referenced record is missing or still in use: {}",
                    info.message()
                ))
            }
            other => Self::Database(other.into()),
        }
    }
}

impl From<OccupancyError<DieselError>> for AppError {
    fn from(value: OccupancyError<DieselError>) -> Self {
        match value {
            OccupancyError::Validation(message) => Self::Validation(message),
            OccupancyError::Conflict(message) => Self::Conflict(message),
            OccupancyError::NotFound(message) => Self::NotFound(message),
            OccupancyError::Store(err) => err.into(),
        }
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(value)
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(value: PathRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_)
            | Self::Token(_)
            | Self::PasswordHash(_)
            | Self::Join(_)
            | Self::Mail(_)
            | Self::File(_)
            | Self::Config(_)
            | Self::Schedule(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: bool,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("request failed: {self}");
            "internal server error".to_owned()
        } else {
            warn!(status = status.as_u16(), "request rejected: {self}");
            self.to_string()
        };
        (
            status,
            Json(ErrorBody {
                error: true,
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_errors_keep_their_category() {
        let err: AppError = OccupancyError::<DieselError>::Conflict("busy".to_owned()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        let err: AppError = OccupancyError::<DieselError>::Validation("bad".to_owned()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err: AppError = OccupancyError::<DieselError>::NotFound("gone".to_owned()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err: AppError = OccupancyError::Store(DieselError::NotFound).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let response = AppError::Database(DieselError::BrokenTransactionManager.into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
