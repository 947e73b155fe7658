use crate::core::{DbError, Result};
use regex::Regex;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^([^@\s]+)@([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+)$")
            .expect("Invalid regex pattern");
}

/// Lowercase every word (usernames).
pub fn normalize_lower(key: &str) -> String {
    key.to_lowercase()
}

/// Check an address and lowercase its domain; the local part is kept as typed.
pub fn normalize_email(key: &str) -> Result<String> {
    let trimmed = key.trim();
    let captures = EMAIL_RE
        .captures(trimmed)
        .ok_or_else(|| DbError::InvalidValueFormat(format!("Invalid email format: '{}'", key)))?;

    Ok(format!("{}@{}", &captures[1], captures[2].to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower() {
        assert_eq!(normalize_lower("Ann MARIE"), "ann marie");
        assert_eq!(normalize_lower(""), "");
    }

    #[test]
    fn test_email() {
        assert_eq!(
            normalize_email("  Ann.Lee@Example.COM ").unwrap(),
            "Ann.Lee@example.com"
        );
        for bad in ["", "ann", "ann@", "@example.com", "ann@example", "a b@example.com", "ann@-x.com"] {
            assert!(
                matches!(normalize_email(bad), Err(DbError::InvalidValueFormat(_))),
                "{} should be rejected",
                bad
            );
        }
    }
}
