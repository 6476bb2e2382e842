//! Common validation utilities for `#[validate(custom(...))]` attributes.

use chrono::{NaiveTime, Timelike};
use validator::ValidationError;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Rejects strings that are empty or whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("Must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Requires a time to fall exactly on the hour.
pub fn validate_on_the_hour(time: &NaiveTime) -> Result<(), ValidationError> {
    if time.minute() == 0 && time.second() == 0 && time.nanosecond() == 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("on_the_hour");
        err.message = Some("Time must be on the hour".into());
        Err(err)
    }
}

/// Requires at least one letter and one digit and `MIN_PASSWORD_LENGTH` characters.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message = Some(
            format!(
                "Password must be at least {} characters with a letter and a digit",
                MIN_PASSWORD_LENGTH
            )
            .into(),
        );
        Err(err)
    }
}
