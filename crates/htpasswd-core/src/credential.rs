//! Credential validation and htpasswd entry generation
//!
//! The one real operation in this crate: take a username/password pair,
//! validate it, and produce a `username:hash` line suitable for an Apache
//! `.htpasswd` file. The hash is bcrypt with a fresh random salt per call.

use crate::error::{HtpasswdError, HtpasswdResult};

/// bcrypt work factor. 2^10 rounds keeps a single hash in the tens of
/// milliseconds while staying expensive enough to resist brute force.
pub const BCRYPT_COST: u32 = 10;

/// A username/password pair supplied by the caller.
///
/// Exists only for the duration of one hashing call; the plaintext password
/// is borrowed and never retained after the hash is computed.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> Credentials<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self { username, password }
    }

    /// Reject empty fields and usernames containing the field separator.
    pub fn validate(&self) -> HtpasswdResult<()> {
        if self.username.is_empty() {
            return Err(HtpasswdError::EmptyUsername);
        }
        if self.password.is_empty() {
            return Err(HtpasswdError::EmptyPassword);
        }
        if self.username.contains(':') {
            return Err(HtpasswdError::UsernameContainsColon);
        }
        Ok(())
    }
}

/// Generate an htpasswd entry: `username:bcrypt-hash`.
///
/// Each call draws a fresh salt, so repeated calls with the same inputs
/// produce different hashes that all verify against the same password.
/// Blocks the calling thread for the duration of the bcrypt computation.
pub fn generate_entry(username: &str, password: &str) -> HtpasswdResult<String> {
    let credentials = Credentials::new(username, password);
    credentials.validate()?;

    let hash = bcrypt::hash(credentials.password, BCRYPT_COST)?;

    Ok(format!("{}:{}", credentials.username, hash))
}
