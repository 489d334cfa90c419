use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

use crate::repository::EntityKind;

#[derive(Debug, Error)]
pub enum PharmacyError {
    #[error("Invalid id: '{0}' is not a 24-character hex ObjectId")]
    InvalidId(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },

    #[error("Referenced {} {id} does not exist", .entity.noun())]
    ReferenceNotFound { entity: EntityKind, id: String },

    #[error("A supplier with tax id {0} already exists")]
    DuplicateTaxId(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("{entity} {id} still has {count} {} record(s)", .dependents.noun())]
    HasDependents {
        entity: EntityKind,
        id: String,
        dependents: EntityKind,
        count: u64,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type PharmacyResult<T> = Result<T, PharmacyError>;

impl PharmacyError {
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        PharmacyError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn reference_not_found(entity: EntityKind, id: impl ToString) -> Self {
        PharmacyError::ReferenceNotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convert PharmacyError to AppError for standardized error responses
impl From<PharmacyError> for AppError {
    fn from(err: PharmacyError) -> Self {
        let message = err.to_string();
        match err {
            PharmacyError::InvalidId(_) => AppError::InvalidObjectId(message),
            PharmacyError::InvalidDate(_)
            | PharmacyError::InvalidPagination(_)
            | PharmacyError::Validation(_) => AppError::BadRequest(message),
            PharmacyError::NotFound { .. } | PharmacyError::ReferenceNotFound { .. } => {
                AppError::NotFound(message)
            }
            PharmacyError::DuplicateTaxId(_)
            | PharmacyError::DuplicateKey(_)
            | PharmacyError::HasDependents { .. } => AppError::Conflict(message),
            PharmacyError::Database(msg) => AppError::Database(msg),
            PharmacyError::Serialization(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for PharmacyError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for PharmacyError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            PharmacyError::DuplicateKey(err.to_string())
        } else {
            PharmacyError::Database(err.to_string())
        }
    }
}

impl From<bson::ser::Error> for PharmacyError {
    fn from(err: bson::ser::Error) -> Self {
        PharmacyError::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for PharmacyError {
    fn from(err: bson::de::Error) -> Self {
        PharmacyError::Serialization(err.to_string())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    const DUPLICATE_KEY: i32 = 11000;

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}
