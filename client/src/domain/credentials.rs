//! Bearer credentials issued by the grading API.
//!
//! Tokens are opaque strings. They are kept in zeroising buffers and never
//! printed in `Debug` output.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Validation errors returned by token constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    /// The token was empty or whitespace only.
    Empty,
    /// The token contained whitespace or control characters, which would
    /// corrupt the `Authorization` header.
    InvalidCharacters,
}

impl fmt::Display for TokenValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "token must not be empty"),
            Self::InvalidCharacters => {
                write!(f, "token must not contain whitespace or control characters")
            }
        }
    }
}

impl std::error::Error for TokenValidationError {}

fn validate_token(raw: &str) -> Result<(), TokenValidationError> {
    if raw.trim().is_empty() {
        return Err(TokenValidationError::Empty);
    }
    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TokenValidationError::InvalidCharacters);
    }
    Ok(())
}

macro_rules! bearer_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Zeroizing<String>);

        impl $name {
            /// Validate and wrap a raw token string.
            pub fn new(raw: impl Into<String>) -> Result<Self, TokenValidationError> {
                let raw = Zeroizing::new(raw.into());
                validate_token(raw.as_str())?;
                Ok(Self(raw))
            }

            /// Borrow the raw token value.
            pub fn expose(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&"<redacted>").finish()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TokenValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.as_str().to_owned()
            }
        }
    };
}

bearer_token! {
    /// Short-lived bearer token authorising API calls.
    AccessToken
}

bearer_token! {
    /// Longer-lived token usable only to mint a new [`AccessToken`].
    RefreshToken
}

impl AccessToken {
    /// Render the `Authorization` header value for this token.
    ///
    /// # Examples
    /// ```
    /// use grading_admin::domain::AccessToken;
    ///
    /// let token = AccessToken::new("abc").unwrap();
    /// assert_eq!(token.bearer_header(), "Bearer abc");
    /// ```
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

/// Access and refresh tokens issued together by a login exchange.
///
/// ## Invariants
/// - Both tokens are present; a store either holds a full pair or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    access: AccessToken,
    refresh: RefreshToken,
}

impl CredentialPair {
    /// Pair freshly issued tokens.
    pub fn new(access: AccessToken, refresh: RefreshToken) -> Self {
        Self { access, refresh }
    }

    /// Current access token.
    pub fn access(&self) -> &AccessToken {
        &self.access
    }

    /// Refresh token used to renew the access token.
    pub fn refresh(&self) -> &RefreshToken {
        &self.refresh
    }

    /// Return a pair with the access token replaced and the refresh token kept.
    #[must_use]
    pub fn with_access(self, access: AccessToken) -> Self {
        Self {
            access,
            refresh: self.refresh,
        }
    }
}
