//! Password hashing and verification with bcrypt.
//!
//! bcrypt is CPU-bound; the async helpers run it on tokio's blocking pool.

use crate::error::AppError;

/// Longest password bcrypt accepts without truncation.
pub const MAX_PASSWORD_BYTES: usize = 72;

pub fn hash_password(plain: &str, cost: u32) -> Result<String, AppError> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Any malformed stored hash counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

pub async fn hash_password_blocking(plain: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&plain, cost)).await?
}

pub async fn verify_password_blocking(plain: String, hash: String) -> Result<bool, AppError> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await?)
}
