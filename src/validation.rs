//! Local form validation, run before any backend call.

use regex::Regex;

/// `local@domain.tld` with no whitespace and exactly one `@` per part.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Symbols accepted as the "special character" of a strong password.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MIN_NAME_CHARS: usize = 2;

/// Rejected form input. The display text is the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Please enter your email address")]
    MissingEmail,
    #[error("Name must be at least 2 characters long")]
    NameTooShort,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error(
        "Password must be at least 8 characters with uppercase, lowercase, number, and special character"
    )]
    WeakPassword,
}

pub fn is_valid_email(email: &str) -> bool {
    Regex::new(EMAIL_PATTERN).is_ok_and(|re| re.is_match(email))
}

pub fn is_strong_password(password: &str) -> bool {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return false;
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    has_upper && has_lower && has_digit && has_symbol
}

/// Validated sign-in credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Validated sign-up fields.
#[derive(Debug, Clone)]
pub struct SignupFields {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub fn validate_login(email: &str, password: &str) -> Result<Credentials, ValidationError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

pub fn validate_signup(
    username: &str,
    email: &str,
    password: &str,
) -> Result<SignupFields, ValidationError> {
    let username = username.trim();
    let email = email.trim();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if username.chars().count() < MIN_NAME_CHARS {
        return Err(ValidationError::NameTooShort);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_strong_password(password) {
        return Err(ValidationError::WeakPassword);
    }

    Ok(SignupFields {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Returns the trimmed email.
pub fn validate_reset(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("j.doe+tag@mail.example.co.uk"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@example.com"));
        assert!(!is_valid_email("jane@@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_strong_password_needs_every_class() {
        assert!(is_strong_password("Passw0rd!"));
        assert!(is_strong_password("aB3{xxxx"));

        assert!(!is_strong_password("Pa0!"), "too short");
        assert!(!is_strong_password("password0!"), "no uppercase");
        assert!(!is_strong_password("PASSWORD0!"), "no lowercase");
        assert!(!is_strong_password("Password!!"), "no digit");
        assert!(!is_strong_password("Password00"), "no symbol");
        assert!(!is_strong_password("Password0-"), "dash is not in the symbol set");
    }

    #[test]
    fn test_signup_check_order() {
        assert_eq!(
            validate_signup("", "jane@example.com", "Passw0rd!").unwrap_err(),
            ValidationError::MissingFields
        );
        assert_eq!(
            validate_signup(" J ", "not-an-email", "weak").unwrap_err(),
            ValidationError::NameTooShort
        );
        assert_eq!(
            validate_signup("Jane", "not-an-email", "weak").unwrap_err(),
            ValidationError::InvalidEmail
        );
        assert_eq!(
            validate_signup("Jane", "jane@example.com", "weak").unwrap_err(),
            ValidationError::WeakPassword
        );

        let fields = validate_signup("  Jane Doe ", " jane@example.com ", "Passw0rd!").unwrap();
        assert_eq!(fields.username, "Jane Doe");
        assert_eq!(fields.email, "jane@example.com");
    }

    #[test]
    fn test_login_does_not_trim_password() {
        let creds = validate_login(" jane@example.com", " secret ").unwrap();
        assert_eq!(creds.email, "jane@example.com");
        assert_eq!(creds.password, " secret ");

        assert_eq!(
            validate_login("   ", "secret").unwrap_err(),
            ValidationError::MissingFields
        );
    }

    #[test]
    fn test_reset_messages() {
        assert_eq!(validate_reset(" ").unwrap_err(), ValidationError::MissingEmail);
        assert_eq!(
            validate_reset("nope").unwrap_err().to_string(),
            "Please enter a valid email address"
        );
    }
}
