//! Free-text validation for name and description entry.

/// Invisible / bidirectional-override code points that are never allowed.
const FORBIDDEN_CHARS: [char; 5] = ['\u{202E}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

const MIN_LEN: usize = 10;
const MAX_LEN: usize = 2000;

/// Checks free-text input against the content policy. First failure wins.
///
/// Returns the trimmed text on success, or the user-facing error message.
pub fn validate_entry(text: &str) -> Result<&str, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("The value must be plain text.".to_string());
    }

    let len = trimmed.chars().count();
    if len < MIN_LEN {
        return Err(format!("Too short. Write at least {MIN_LEN} characters."));
    }
    if len > MAX_LEN {
        return Err(format!(
            "Too long ({len} characters). Keep it under {MAX_LEN}."
        ));
    }

    if trimmed.chars().any(|c| FORBIDDEN_CHARS.contains(&c)) {
        return Err("Forbidden invisible characters detected.".to_string());
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::validate_entry;

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(validate_entry("").is_err());
        assert!(validate_entry("   \n\t ").is_err());
    }

    #[test]
    fn length_boundaries() {
        assert!(validate_entry(&"x".repeat(9)).is_err());
        assert!(validate_entry(&"x".repeat(10)).is_ok());
        assert!(validate_entry(&"x".repeat(2000)).is_ok());
        assert!(validate_entry(&"x".repeat(2001)).is_err());
    }

    #[test]
    fn too_long_message_quotes_actual_length() {
        let err = validate_entry(&"x".repeat(2345)).unwrap_err();
        assert!(err.contains("2345"));
    }

    #[test]
    fn length_is_measured_after_trimming() {
        let padded = format!("   {}   ", "x".repeat(10));
        assert_eq!(validate_entry(&padded).unwrap(), "x".repeat(10));
    }

    #[test]
    fn rejects_invisible_characters() {
        assert!(validate_entry("perfectly\u{202E}normal").is_err());
        assert!(validate_entry("zero\u{200B}width here").is_err());
        assert!(validate_entry("bom\u{FEFF} in the middle").is_err());
    }
}
