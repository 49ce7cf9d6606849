use crate::error::AppError;
use bcrypt::{hash, verify};

/// One-way transform of a plaintext password. Only the digest is ever
/// persisted or compared.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, 12) // bcrypt default cost is 12
        .map_err(|e| AppError::InternalServerError(format!("failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("failed to verify password: {}", e)))
}
