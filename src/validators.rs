/// Input validators for the HTTP layer
///
/// Checks request shapes before they reach the auth service:
/// 1. Email format and length
/// 2. Password length bounds from configuration
/// 3. Optional display name

use lazy_static::lazy_static;
use regex::Regex;

use crate::configuration::PasswordSettings;
use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 3;
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_NAME_LENGTH: usize = 256;

lazy_static! {
    // RFC 5322 simplified; the domain needs at least one dot
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).expect("email regex is valid");
}

/// Validates an email address and returns it trimmed.
///
/// Case is preserved: emails are stored and matched exactly.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    let local_part_too_long = trimmed
        .split_once('@')
        .map_or(true, |(local, _)| local.len() > MAX_LOCAL_PART_LENGTH);
    if local_part_too_long {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Validates password length in characters against the configured bounds.
pub fn validate_password(password: &str, bounds: &PasswordSettings) -> Result<(), ValidationError> {
    let length = password.chars().count();

    if length < bounds.min_length {
        return Err(ValidationError::TooShort("password", bounds.min_length));
    }

    if length > bounds.max_length {
        return Err(ValidationError::TooLong("password", bounds.max_length));
    }

    Ok(())
}

/// Validates an optional display name; blank names become `None`.
pub fn validate_full_name(name: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("full_name", MAX_NAME_LENGTH));
    }

    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat("full_name"));
    }

    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MIN_BCRYPT_COST;

    fn bounds() -> PasswordSettings {
        PasswordSettings {
            min_length: 6,
            max_length: 72,
            bcrypt_cost: MIN_BCRYPT_COST,
        }
    }

    #[test]
    fn test_valid_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.email@domain.co.uk").is_ok());
        assert!(validate_email("user+tag@example.com").is_ok());
        assert!(validate_email("a@x.com").is_ok());
    }

    #[test]
    fn test_email_is_trimmed_but_case_preserved() {
        assert_eq!(validate_email("  Ada@Example.com ").unwrap(), "Ada@Example.com");
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@@example.com").is_err());
        assert!(validate_email("user@localhost").is_err());
        assert!(validate_email("user name@example.com").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&too_long).is_err());

        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(validate_email(&long_local).is_err());

        assert_eq!(validate_email(""), Err(ValidationError::EmptyField("email")));
    }

    #[test]
    fn test_password_bounds() {
        assert!(validate_password("secret", &bounds()).is_ok());
        assert!(validate_password(&"a".repeat(72), &bounds()).is_ok());

        assert_eq!(
            validate_password("short", &bounds()),
            Err(ValidationError::TooShort("password", 6))
        );
        assert_eq!(
            validate_password(&"a".repeat(73), &bounds()),
            Err(ValidationError::TooLong("password", 72))
        );
    }

    #[test]
    fn test_password_length_counts_characters() {
        // 72 characters, 144 bytes: accepted, then truncated by the hasher
        assert!(validate_password(&"é".repeat(72), &bounds()).is_ok());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(validate_full_name(None).unwrap(), None);
        assert_eq!(validate_full_name(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_full_name(Some(" Jean-Pierre O'Brien ")).unwrap().as_deref(),
            Some("Jean-Pierre O'Brien")
        );
    }

    #[test]
    fn test_full_name_rejections() {
        assert!(validate_full_name(Some(&"a".repeat(257))).is_err());
        assert!(validate_full_name(Some("Name\0with\0null")).is_err());
    }
}
