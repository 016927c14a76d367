//! Login and registration inputs.
//!
//! Constructors validate raw form input before any network call is made.

use std::fmt;

use serde_json::{Value, json};
use zeroize::Zeroizing;

/// Errors returned when login or registration input is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// Password and confirmation differ.
    PasswordMismatch,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username is required."),
            Self::EmptyPassword => write!(f, "Password is required."),
            Self::PasswordMismatch => write!(f, "Passwords do not match."),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated username/password pair used for the token exchange.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use grading_admin::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as typed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// JSON body shared by `token/` and `register/`.
    pub fn to_payload(&self) -> Value {
        json!({
            "username": self.username(),
            "password": self.password(),
        })
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account creation request with its confirmation field checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: LoginCredentials,
}

impl Registration {
    /// Validate raw registration input.
    ///
    /// The confirmation check runs first so a mismatch is reported even when
    /// other fields are also invalid.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Self, CredentialsValidationError> {
        if password != confirmation {
            return Err(CredentialsValidationError::PasswordMismatch);
        }
        let credentials = LoginCredentials::try_from_parts(username, password)?;
        Ok(Self { credentials })
    }

    /// Credentials of the account being created.
    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialsValidationError::EmptyUsername)]
    #[case("   ", "pw", CredentialsValidationError::EmptyUsername)]
    #[case("user", "", CredentialsValidationError::EmptyPassword)]
    fn invalid_login_input(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn payload_carries_trimmed_username() {
        let creds = LoginCredentials::try_from_parts("  alice ", " secret ").expect("valid");
        assert_eq!(
            creds.to_payload(),
            json!({"username": "alice", "password": " secret "})
        );
    }

    #[rstest]
    fn debug_output_hides_the_password() {
        let creds = LoginCredentials::try_from_parts("alice", "hunter2").expect("valid");
        let registration =
            Registration::try_from_parts("alice", "hunter2", "hunter2").expect("valid");
        for rendered in [format!("{creds:?}"), format!("{registration:?}")] {
            assert!(rendered.contains("alice"));
            assert!(!rendered.contains("hunter2"), "password leaked: {rendered}");
        }
    }

    #[rstest]
    #[case("alice", "pw1", "pw2", Err(CredentialsValidationError::PasswordMismatch))]
    #[case("", "pw1", "pw2", Err(CredentialsValidationError::PasswordMismatch))]
    #[case("", "pw", "pw", Err(CredentialsValidationError::EmptyUsername))]
    #[case("alice", "pw", "pw", Ok(()))]
    fn registration_checks_confirmation_first(
        #[case] username: &str,
        #[case] password: &str,
        #[case] confirmation: &str,
        #[case] expected: Result<(), CredentialsValidationError>,
    ) {
        let outcome = Registration::try_from_parts(username, password, confirmation).map(|_| ());
        assert_eq!(outcome, expected);
    }
}
