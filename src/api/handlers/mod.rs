//! API handlers and shared helpers.

pub mod health;
pub mod login;
pub mod mfa;

use regex::Regex;

/// Lightweight email sanity check used by the login handler before any
/// credential comparison.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(valid_email("user@example.com"));
        assert!(valid_email("a.b+c@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!valid_email(""));
        assert!(!valid_email("user"));
        assert!(!valid_email("user@"));
        assert!(!valid_email("user@example"));
        assert!(!valid_email("user name@example.com"));
    }
}
