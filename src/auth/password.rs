use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hashes an account password into the PHC string kept in `accounts.password_hash`.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "failed to hash account password");
            anyhow!("hashing account password: {e}")
        })
}

pub fn verify_password(plain: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow!("parsing stored password hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Result of checking a requested password change.
#[derive(Debug, PartialEq, Eq)]
pub enum PasswordChange {
    /// The new password verifies against the current hash.
    Unchanged,
    /// Confirmation differs from the new password.
    Mismatch,
    /// Hash to store.
    Accepted(String),
}

/// The unchanged check runs before the confirmation check.
pub fn prepare_change(
    current_hash: &str,
    password: &str,
    confirmation: &str,
) -> anyhow::Result<PasswordChange> {
    if verify_password(password, current_hash)? {
        return Ok(PasswordChange::Unchanged);
    }
    if password != confirmation {
        return Ok(PasswordChange::Mismatch);
    }
    Ok(PasswordChange::Accepted(hash_password(password)?))
}
