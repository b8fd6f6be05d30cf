use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

pub const CODE_LEN: usize = 8;

/// Generation attempts before giving up on a free code.
pub const MAX_ATTEMPTS: usize = 10;

/// A fresh code drawn uniformly from `[A-Za-z0-9]` with the OS CSPRNG.
/// Uniqueness is the caller's job.
pub fn issue() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(CODE_LEN)
        .map(char::from)
        .collect()
}

/// Cheap shape check applied before any lookup.
pub fn is_valid_format(code: &str) -> bool {
    static FORMAT: OnceLock<Regex> = OnceLock::new();
    FORMAT
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{6,32}$").expect("static regex"))
        .is_match(code)
}
