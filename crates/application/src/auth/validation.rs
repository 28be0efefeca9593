use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::{AppError, AppResult};

/// E.164: a plus, a non-zero country digit, 7 to 15 digits in total.
pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").unwrap());

/// Strips common separators and turns a leading `00` into `+`.
/// Shape is not checked here; see [`validate_phone_number`].
pub fn normalize_phone(raw: &str) -> String {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    match compact.strip_prefix("00") {
        Some(rest) => format!("+{rest}"),
        None => compact,
    }
}

/// Custom validator for an already normalized phone number
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone_number"))
    }
}

/// Presence, normalization and format in one step.
pub fn require_phone(raw: Option<&str>) -> AppResult<String> {
    let raw = raw
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Phone number is required".to_string()))?;
    let phone = normalize_phone(raw);
    validate_phone_number(&phone).map_err(|_| {
        AppError::Validation(
            "Invalid phone number format. Use international format, e.g. +919876543210"
                .to_string(),
        )
    })?;
    Ok(phone)
}

/// Log-safe rendering: `+66812345678` becomes `+6681****678`.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_separators() {
        assert_eq!(normalize_phone(" +91 98765-43210 "), "+919876543210");
        assert_eq!(normalize_phone("+1 (555) 010.2030"), "+15550102030");
        assert_eq!(normalize_phone("0066812345678"), "+66812345678");
    }

    #[test]
    fn phone_format() {
        assert!(validate_phone_number("+919876543210").is_ok());
        assert!(validate_phone_number("919876543210").is_err());
        assert!(validate_phone_number("+0123456789").is_err());
        assert!(validate_phone_number("+12345").is_err());
        assert!(validate_phone_number("+1234567890123456").is_err());
    }

    #[test]
    fn require_phone_reports_missing_and_malformed() {
        assert!(matches!(require_phone(None), Err(AppError::Validation(_))));
        assert!(matches!(require_phone(Some("   ")), Err(AppError::Validation(_))));
        assert!(matches!(require_phone(Some("abc")), Err(AppError::Validation(_))));
        assert_eq!(
            require_phone(Some("+91 98765 43210")).unwrap(),
            "+919876543210"
        );
    }

    #[test]
    fn masking_keeps_prefix_and_suffix() {
        assert_eq!(mask_phone("+66812345678"), "+6681****678");
        assert_eq!(mask_phone("+1234"), "*****");
    }
}
