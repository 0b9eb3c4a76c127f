//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time.

/// Maximum record name length, in characters
pub const MAX_NAME_LENGTH: usize = 200;

/// Validate a company name. Delegates to the config rules.
pub fn validate_company_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    crate::config::validate_company_name(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate a record name: non-blank and at most [`MAX_NAME_LENGTH`] chars.
pub fn validate_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters (got {})",
            trimmed.chars().count()
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a canvas coordinate.
pub fn validate_coordinate(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid coordinate: '{s}'"))?;
    if !value.is_finite() {
        return Err(format!("Coordinate must be a finite number: '{s}'"));
    }
    Ok(value)
}
