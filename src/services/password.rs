// SPDX-License-Identifier: MIT

//! Password hashing with PBKDF2-HMAC-SHA256.
//!
//! Hashes are stored as `pbkdf2$<iterations>$<salt_b64>$<hash_b64>` so the
//! iteration count can be raised later without invalidating existing
//! credentials.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use ring::{pbkdf2, rand, rand::SecureRandom};
use std::num::NonZeroU32;

const ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Errors from hashing or verifying a password.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to generate salt")]
    Rng,

    #[error("Stored password hash is malformed")]
    Malformed,
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let rng = rand::SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt).map_err(|_| PasswordError::Rng)?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        ITERATIONS,
        &salt,
        password.as_bytes(),
        &mut hash,
    );

    Ok(format!(
        "pbkdf2${}${}${}",
        ITERATIONS,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    ))
}

/// Verify a password against a stored hash string.
///
/// Comparison happens inside `ring` in constant time. Returns `false` for
/// a wrong password, `Err` only when the stored value cannot be parsed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let mut parts = stored.split('$');

    let scheme = parts.next().ok_or(PasswordError::Malformed)?;
    if scheme != "pbkdf2" {
        return Err(PasswordError::Malformed);
    }

    let iterations: u32 = parts
        .next()
        .and_then(|raw| raw.parse().ok())
        .filter(|&n| n > 0)
        .ok_or(PasswordError::Malformed)?;
    let salt = parts
        .next()
        .and_then(|raw| STANDARD_NO_PAD.decode(raw).ok())
        .ok_or(PasswordError::Malformed)?;
    let hash = parts
        .next()
        .and_then(|raw| STANDARD_NO_PAD.decode(raw).ok())
        .ok_or(PasswordError::Malformed)?;

    if parts.next().is_some() {
        return Err(PasswordError::Malformed);
    }

    let iterations = NonZeroU32::new(iterations).ok_or(PasswordError::Malformed)?;

    Ok(pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok())
}
