use std::fmt;

use thiserror::Error;

/// Longest identifier accepted (the maximum length of an email address).
const MAX_USERNAME_LENGTH: usize = 254;

/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Invalid email")]
    InvalidEmail,

    #[error("Email is too long")]
    UsernameTooLong,

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password is too long")]
    PasswordTooLong,
}

/// Login form input, checked before anything is sent.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, CredentialsError> {
        let username = username.into();
        let password = password.into();

        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(CredentialsError::UsernameTooLong);
        }
        if !looks_like_email(&username) {
            return Err(CredentialsError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(CredentialsError::EmptyPassword);
        }
        if password.chars().count() > MAX_PASSWORD_LENGTH {
            return Err(CredentialsError::PasswordTooLong);
        }

        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Non-whitespace text with an `@` that has something on both sides.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    s.char_indices()
        .any(|(i, c)| c == '@' && i > 0 && i + 1 < s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_email_and_password() {
        let creds = Credentials::new("admin@authsuite.dev", "hunter2").expect("valid");
        assert_eq!(creds.username(), "admin@authsuite.dev");
        assert_eq!(creds.password(), "hunter2");
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("a@b"));
        assert!(looks_like_email("first.last@example.co.uk"));
        assert!(looks_like_email("a@@b"));
        assert!(!looks_like_email(""));
        assert!(!looks_like_email("@b"));
        assert!(!looks_like_email("a@"));
        assert!(!looks_like_email("ab"));
        assert!(!looks_like_email("a @b"));
        assert!(!looks_like_email("a@b\n"));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            Credentials::new("not-an-email", "pw").unwrap_err(),
            CredentialsError::InvalidEmail
        );
        assert_eq!(
            Credentials::new("a@b", "").unwrap_err(),
            CredentialsError::EmptyPassword
        );
        assert_eq!(
            Credentials::new(format!("{}@b", "a".repeat(300)), "pw").unwrap_err(),
            CredentialsError::UsernameTooLong
        );
        assert_eq!(
            Credentials::new("a@b", "p".repeat(129)).unwrap_err(),
            CredentialsError::PasswordTooLong
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("a@b", "hunter2").expect("valid");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("a@b"));
        assert!(!shown.contains("hunter2"));
    }
}
