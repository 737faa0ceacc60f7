//! Salted bcrypt password capability.
//!
//! The stored hash covers `raw + salt`. Salts are random bytes encoded as
//! standard base64; six bytes keep a 64 character password plus salt inside
//! bcrypt's 72 byte input window.

use bcrypt::{DEFAULT_COST, verify};
use data_encoding::BASE64;
use rand::RngCore;

use crate::errors::AppException;

pub const DEFAULT_SALT_SIZE: usize = 6;

pub fn generate_salt(size: usize) -> String {
    let mut bytes = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64.encode(&bytes)
}

pub fn hash(raw: &str, salt: &str) -> Result<String, AppException> {
    hash_with_cost(raw, salt, DEFAULT_COST)
}

/// Same as [`hash`] with an explicit work factor; low costs are for tests and seeding.
pub fn hash_with_cost(raw: &str, salt: &str, cost: u32) -> Result<String, AppException> {
    let combined = format!("{raw}{salt}");
    bcrypt::hash(combined, cost)
        .map_err(|e| AppException::internal(format!("Failed to hash password: {e}")))
}

/// A malformed stored hash compares as a mismatch.
pub fn compare(raw: &str, salt: &str, hashed: &str) -> bool {
    let combined = format!("{raw}{salt}");
    match verify(combined, hashed) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be parsed");
            false
        }
    }
}
