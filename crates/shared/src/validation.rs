//! Field validators shared by request DTOs.
//!
//! Each function has the signature expected by `#[validate(custom(function = ...))]`.

use validator::ValidationError;

/// Maximum length of a person's full name or a group name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Minimum password length for accounts created by an admin.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length (Argon2 accepts more, this bounds request size).
pub const MAX_PASSWORD_LENGTH: usize = 128;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a display name: not blank after trimming, at most
/// [`MAX_NAME_LENGTH`] characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(error("name_blank", "Name must not be blank"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(error(
            "name_length",
            "Name must be at most 100 characters",
        ));
    }
    Ok(())
}

lazy_static::lazy_static! {
    /// Login names: ASCII letters, digits, `.`, `_`, `-`; must start with a letter or digit.
    pub static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
}

/// Validates a login name: 3-32 characters matching [`USERNAME_REGEX`].
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(error(
            "username_length",
            "Username must be between 3 and 32 characters",
        ));
    }

    if USERNAME_REGEX.is_match(username) {
        Ok(())
    } else {
        Err(error(
            "username_format",
            "Username may contain only letters, digits, '.', '_' and '-'",
        ))
    }
}

/// Validates a new password's length bounds.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(error(
            "password_short",
            "Password must be at least 6 characters",
        ));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(error(
            "password_long",
            "Password must be at most 128 characters",
        ));
    }
    Ok(())
}

/// Normalizes a username for case-insensitive comparison.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
