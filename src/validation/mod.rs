use std::fmt;

pub const DELIVERY_ADDRESS_MIN_LEN: usize = 5;
pub const PHONE_MIN_LEN: usize = 5;
pub const PHONE_MAX_LEN: usize = 20;
pub const NOTES_MAX_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_min_len(field: &'static str, value: &str, min_len: usize) -> ValidationResult {
    if value.len() < min_len {
        return Err(ValidationError::new(
            field,
            format!("must be at least {} characters", min_len),
        ));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_delivery_address(address: &str) -> ValidationResult {
    let address = sanitize_string(address);
    validate_required("delivery_address", &address)?;
    validate_min_len("delivery_address", &address, DELIVERY_ADDRESS_MIN_LEN)
}

pub fn validate_phone(phone: &str) -> ValidationResult {
    let phone = sanitize_string(phone);
    validate_required("phone", &phone)?;
    validate_min_len("phone", &phone, PHONE_MIN_LEN)?;
    validate_max_len("phone", &phone, PHONE_MAX_LEN)
}

pub fn validate_notes(notes: &str) -> ValidationResult {
    validate_max_len("notes", notes, NOTES_MAX_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_control_chars_and_collapses_whitespace() {
        assert_eq!(sanitize_string("  12\tMain   St\n"), "12 Main St");
    }

    #[test]
    fn test_delivery_address_too_short() {
        let err = validate_delivery_address("ab").unwrap_err();
        assert_eq!(err.field, "delivery_address");
    }

    #[test]
    fn test_delivery_address_ok() {
        assert!(validate_delivery_address("12 Main Street, Springfield").is_ok());
    }

    #[test]
    fn test_phone_bounds() {
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("+1 555 000 1234").is_ok());
        assert!(validate_phone("123456789012345678901").is_err());
    }

    #[test]
    fn test_empty_required_field() {
        assert!(validate_required("phone", "   ").is_err());
    }
}
