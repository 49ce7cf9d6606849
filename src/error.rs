//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. Every layer converts lower-level failures into one of its
//! variants before returning, so no raw store or library error ever escapes to
//! the HTTP boundary untranslated.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handler results
//! convert into `{ code, message, data }` envelopes with a consistent HTTP
//! status: 400 for validation problems, 401 for authentication/credential
//! failures, 404 for missing records, 500 for store or internal failures.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `bcrypt::BcryptError` and the crate's `TokenError` allow conversion with
//! the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::messages;
use crate::response::ApiResponse;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing/invalid token, or a failed credential check (HTTP 401).
    Unauthorized(String),
    /// Malformed or invalid client input (HTTP 400).
    BadRequest(String),
    /// A requested record does not exist or is not owned by the caller (HTTP 404).
    NotFound(String),
    /// Failed input validation from the `validator` crate (HTTP 400).
    ValidationError(String),
    /// Unexpected server-side failure (HTTP 500). The message is logged, the
    /// client sees a generic one.
    InternalServerError(String),
    /// Persistence failure (HTTP 500). Same logging policy as above.
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
            // Store and internal failures are logged server-side only; the
            // client gets a generic message.
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                log::error!("{}", self);
                messages::SYSTEM_ERROR
            }
        };
        HttpResponse::build(self.status_code()).json(ApiResponse::fail(message))
    }
}

/// `sqlx::Error::RowNotFound` maps to `NotFound`; anything else is a store
/// failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Token verification failures all surface as 401; the message distinguishes
/// an expired token from a malformed or tampered one.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Expired => AppError::Unauthorized(messages::TOKEN_EXPIRED.into()),
            TokenError::SignatureInvalid | TokenError::Malformed => {
                AppError::Unauthorized(messages::INVALID_TOKEN.into())
            }
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
