//! Helpers for trimmed, length-bounded text fields.

use super::ValidationError;

/// Trims `raw` and requires 1..=max characters.
pub fn required_text(field: &str, raw: &str, max: usize) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::too_long(field, max));
    }
    Ok(value.to_string())
}

/// Like [`required_text`], but blank input becomes `None`.
pub fn optional_text(
    field: &str,
    raw: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => required_text(field, value, max).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims() {
        assert_eq!(required_text("name", "  Ada ", 10).unwrap(), "Ada");
    }

    #[test]
    fn required_text_counts_characters_not_bytes() {
        assert!(required_text("name", "ééééé", 5).is_ok());
        assert!(required_text("name", "éééééé", 5).is_err());
    }

    #[test]
    fn optional_text_maps_blank_to_none() {
        assert_eq!(optional_text("phone", Some("   "), 10).unwrap(), None);
        assert_eq!(optional_text("phone", None, 10).unwrap(), None);
        assert_eq!(
            optional_text("phone", Some(" 555 "), 10).unwrap(),
            Some("555".to_string())
        );
    }
}
