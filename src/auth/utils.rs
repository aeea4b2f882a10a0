//! Password helpers shared by password-based plugins.

use crate::config::ConfigStore;
use crate::definitions;
use crate::registry::Taxonomy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Longest accepted password, in characters.
pub const MAX_PASSWORD_LEN: usize = 32;

static PASSWORD_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]*$").expect("password pattern is valid"));

/// Lowercase hex SHA-256 of `raw` followed by `salt`.
pub fn hash_password(raw: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// [`hash_password`] with the salt configured under
/// `io.personium.core.auth.password.salt`.
pub fn hash_password_configured(raw: &str, config: &ConfigStore) -> String {
    hash_password(raw, &config.auth_password_salt())
}

/// True if `raw` is 6 to 32 characters from `[a-zA-Z0-9-_]`.
pub fn is_valid_password(raw: &str) -> bool {
    (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&raw.chars().count())
        && PASSWORD_CHARS.is_match(raw)
}

/// Reject passwords that fail [`is_valid_password`].
///
/// # Errors
///
/// The taxonomy's `PASSWORD_INVALID` exception (`PR400-AN-0001`).
pub fn check_validate_password(raw: &str, taxonomy: &Taxonomy) -> crate::Result<()> {
    if is_valid_password(raw) {
        Ok(())
    } else {
        Err(taxonomy.raise(&definitions::PASSWORD_INVALID))
    }
}
