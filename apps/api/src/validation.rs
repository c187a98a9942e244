//! Input checks shared by the route handlers. Each returns a
//! `AppError::Validation` naming the offending field.

use crate::errors::AppError;

const MAX_SLUG_LEN: usize = 50;

/// Loose email check: one `@`, a non-empty local part, and a dotted domain.
pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(email.to_lowercase())
    } else {
        Err(AppError::Validation("email must be a valid address".to_string()))
    }
}

/// Returns the trimmed text, rejecting empty or over-long values.
pub fn require_text(field: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

/// Trims optional text; blank strings become `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Questionnaire types are lowercase slugs such as `inscription` or `mbti`.
pub fn validate_slug(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    let ok = !value.is_empty()
        && value.len() <= MAX_SLUG_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if ok {
        Ok(value.to_string())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be a lowercase slug of at most {MAX_SLUG_LEN} characters"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_accepts_and_normalises() {
        assert_eq!(validate_email(" Lea@Zelia.FR ").unwrap(), "lea@zelia.fr");
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        for bad in ["", "lea", "@zelia.fr", "lea@", "lea@zelia", "lea@zelia.", "l ea@zelia.fr", "a@b@c.fr"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_require_text_limits() {
        assert_eq!(require_text("subject", "  bug  ", 10).unwrap(), "bug");
        assert!(require_text("subject", "   ", 10).is_err());
        assert!(require_text("subject", "ééééééééééé", 10).is_err());
    }

    #[test]
    fn test_optional_text_drops_blank() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" Lyon ")).as_deref(), Some("Lyon"));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_validate_slug() {
        assert_eq!(validate_slug("questionnaire_type", " mbti ").unwrap(), "mbti");
        assert!(validate_slug("questionnaire_type", "MBTI").is_err());
        assert!(validate_slug("questionnaire_type", "a b").is_err());
        assert!(validate_slug("questionnaire_type", &"a".repeat(51)).is_err());
    }
}
