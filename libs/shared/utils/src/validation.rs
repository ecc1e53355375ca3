use thiserror::Error;

/// A user-facing validation failure. These re-prompt in place; they are
/// never fatal to a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: &str) -> Self {
        Self(message.to_string())
    }
}

const FAKE_NAMES: [&str; 4] = ["test test", "asdf asdf", "john doe", "jane doe"];

/// Validate a full name, returning it with whitespace collapsed.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

    if name.is_empty() {
        return Err(ValidationError::new("Name cannot be empty"));
    }

    if name.chars().count() < 2 {
        return Err(ValidationError::new("Name is too short"));
    }

    // Hyphens and apostrophes cover names like O'Connor or Jean-Pierre.
    if !name
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
    {
        return Err(ValidationError::new(
            "Name can only contain letters, spaces, hyphens, and apostrophes",
        ));
    }

    if !name.contains(' ') {
        return Err(ValidationError::new(
            "Please provide both first and last name",
        ));
    }

    if name.split(' ').any(|part| part.chars().count() < 2) {
        return Err(ValidationError::new(
            "Each part of the name must be at least 2 characters",
        ));
    }

    if FAKE_NAMES.contains(&name.to_lowercase().as_str()) {
        return Err(ValidationError::new("Please provide your real name"));
    }

    Ok(name)
}

/// Minimal email check: both `@` and `.` must be present.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if !email.contains('@') || !email.contains('.') {
        return Err(ValidationError::new("Please enter a valid email address"));
    }
    Ok(email.to_string())
}

const TEST_PHONE_NUMBERS: [&str; 4] = [
    "1234567890",
    "0987654321",
    "1111111111",
    "0000000000",
];

/// Validate a phone number and return it in display form.
pub fn validate_phone(phone: &str) -> Result<String, ValidationError> {
    if phone.is_empty() {
        return Err(ValidationError::new("Phone number cannot be empty"));
    }

    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 10 || digits.len() > 15 {
        return Err(ValidationError::new(
            "Phone number must be between 10 and 15 digits",
        ));
    }

    if digits.starts_with("91") && digits.len() != 12 {
        return Err(ValidationError::new(
            "Indian phone numbers should be 10 digits after country code",
        ));
    }

    let last_ten = &digits[digits.len() - 10..];
    if TEST_PHONE_NUMBERS.contains(&last_ten) {
        return Err(ValidationError::new(
            "This appears to be a test phone number",
        ));
    }

    let formatted = if digits.starts_with("91") {
        format!("+{}-{}-{}", &digits[..2], &digits[2..7], &digits[7..])
    } else {
        format!("+{}", digits)
    };

    Ok(formatted)
}
