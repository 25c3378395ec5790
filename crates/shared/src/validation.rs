//! Common validation utilities.

use validator::{ValidateEmail, ValidationError};

/// Validates that a string is a well-formed email address.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Invalid email address".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("bob.smith+tag@corp.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_email_error_message() {
        let err = validate_email("nope").unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "Invalid email address");
    }
}
