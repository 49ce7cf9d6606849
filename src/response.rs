//! The uniform `{ code, message, data }` response envelope.
//!
//! Every endpoint, success or failure, responds with this shape; clients
//! dispatch on `code` (1 = success, 0 = failure) in addition to the HTTP
//! status.

use serde::{Deserialize, Serialize};

pub const CODE_SUCCESS: i32 = 1;
pub const CODE_FAILURE: i32 = 0;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying a payload.
    pub fn ok(data: T, message: &str) -> Self {
        Self {
            code: CODE_SUCCESS,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Successful acknowledgement with no payload.
    pub fn message(message: &str) -> Self {
        Self {
            code: CODE_SUCCESS,
            message: message.to_string(),
            data: None,
        }
    }

    /// Failure envelope. The HTTP status carries the error class; the body
    /// carries the human-readable message.
    pub fn fail(message: &str) -> Self {
        Self {
            code: CODE_FAILURE,
            message: message.to_string(),
            data: None,
        }
    }
}
