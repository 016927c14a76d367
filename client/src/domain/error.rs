//! Client-side error taxonomy.
//!
//! Every failure of a use case is an [`ApiError`]. Call sites nearest the
//! user turn it into display-ready text with [`ApiError::display_message`];
//! nothing is left to propagate to a global crash boundary.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::CredentialsValidationError;
use crate::domain::ports::{CredentialStoreError, TransportError};

/// Field name to messages, ordered by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key under which errors not tied to one field are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Message shown for transport failures.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Decoded API error payload.
///
/// Accepts `{"detail": "..."}` as well as per-field maps whose values are a
/// string or a list of strings. Anything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    /// General error text.
    pub detail: Option<String>,
    /// Per-field messages.
    pub fields: FieldErrors,
}

impl ErrorBody {
    /// Parse a raw response body; malformed JSON yields an empty body.
    ///
    /// # Examples
    /// ```
    /// use grading_admin::domain::ErrorBody;
    ///
    /// let body = ErrorBody::parse(r#"{"name": ["This field may not be blank."]}"#);
    /// assert_eq!(body.fields["name"], vec!["This field may not be blank."]);
    /// assert!(body.detail.is_none());
    /// ```
    pub fn parse(raw: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
            return Self::default();
        };

        let mut body = Self::default();
        for (key, value) in map {
            if key == "detail" {
                body.detail = value.as_str().map(str::to_owned);
                continue;
            }
            let messages = match value {
                Value::String(message) => vec![message],
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect(),
                _ => Vec::new(),
            };
            if !messages.is_empty() {
                body.fields.insert(key, messages);
            }
        }
        body
    }
}

/// Failure of a client use case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Local validation rejected the input before any call was made.
    #[error("invalid input")]
    InvalidInput {
        /// Messages per offending field.
        fields: FieldErrors,
    },
    /// No usable session (HTTP 401).
    #[error("authentication required")]
    Unauthenticated {
        /// API-provided reason.
        detail: Option<String>,
    },
    /// The session lacks permission (HTTP 403).
    #[error("permission denied")]
    Forbidden {
        /// API-provided reason.
        detail: Option<String>,
    },
    /// The API rejected submitted fields (HTTP 400).
    #[error("request rejected by validation")]
    Validation {
        /// API-provided reason.
        detail: Option<String>,
        /// Messages per offending field.
        fields: FieldErrors,
    },
    /// Any other non-success status.
    #[error("api rejected request with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// API-provided reason.
        detail: Option<String>,
    },
    /// The API could not be reached.
    #[error("network failure: {message}")]
    Network {
        /// Transport error text.
        message: String,
    },
    /// The API answered with an unexpected payload.
    #[error("unexpected api response: {message}")]
    Decode {
        /// Decoder error text.
        message: String,
    },
    /// The credential store failed.
    #[error("credential storage failure: {message}")]
    Storage {
        /// Storage error text.
        message: String,
    },
}

impl ApiError {
    /// Local validation failure for one field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), vec![message.into()]);
        Self::InvalidInput { fields }
    }

    /// Whether the failure means the session is gone.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }

    /// Per-field messages, when the failure carries any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::InvalidInput { fields } | Self::Validation { fields, .. }
                if !fields.is_empty() =>
            {
                Some(fields)
            }
            _ => None,
        }
    }

    /// API-provided reason, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated { detail }
            | Self::Forbidden { detail }
            | Self::Validation { detail, .. }
            | Self::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Display-ready text: the API's reason, local validation text, a generic
    /// network message, or `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_owned();
        }
        match self {
            Self::InvalidInput { fields } => {
                let joined = fields.values().flatten().cloned().collect::<Vec<_>>().join(" ");
                if joined.is_empty() {
                    fallback.to_owned()
                } else {
                    joined
                }
            }
            Self::Network { .. } => NETWORK_ERROR_MESSAGE.to_owned(),
            _ => fallback.to_owned(),
        }
    }
}

/// Failure of a form submission or page load, ready for display.
///
/// `message` is the general text; `fields` holds per-field messages to show
/// next to the offending inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FormError {
    /// General display text.
    pub message: String,
    /// Per-field display text.
    pub fields: FieldErrors,
    /// Underlying failure.
    #[source]
    pub source: ApiError,
}

impl FormError {
    /// Convert `source` using `fallback` when the API gave no reason.
    ///
    /// # Examples
    /// ```
    /// use grading_admin::domain::{ApiError, FormError};
    ///
    /// let err = FormError::from_api(ApiError::Decode { message: "eof".into() }, "Failed.");
    /// assert_eq!(err.message, "Failed.");
    /// assert!(err.fields.is_empty());
    /// ```
    pub fn from_api(source: ApiError, fallback: &str) -> Self {
        Self {
            message: source.display_message(fallback),
            fields: source.field_errors().cloned().unwrap_or_default(),
            source,
        }
    }

    /// Whether the failure means the session is gone.
    pub fn is_unauthenticated(&self) -> bool {
        self.source.is_unauthenticated()
    }
}

impl From<TransportError> for ApiError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::Status { status, body } => {
                let ErrorBody { detail, fields } = ErrorBody::parse(&body);
                match status {
                    401 => Self::Unauthenticated { detail },
                    403 => Self::Forbidden { detail },
                    400 if !fields.is_empty() => Self::Validation { detail, fields },
                    _ => Self::Rejected { status, detail },
                }
            }
            TransportError::Network { message } | TransportError::Timeout { message } => {
                Self::Network { message }
            }
            TransportError::Decode { message } => Self::Decode { message },
        }
    }
}

impl From<CredentialStoreError> for ApiError {
    fn from(value: CredentialStoreError) -> Self {
        Self::Storage {
            message: value.to_string(),
        }
    }
}

impl From<CredentialsValidationError> for ApiError {
    fn from(value: CredentialsValidationError) -> Self {
        let field = match value {
            CredentialsValidationError::EmptyUsername => "username",
            CredentialsValidationError::EmptyPassword => "password",
            CredentialsValidationError::PasswordMismatch => NON_FIELD_ERRORS,
        };
        Self::invalid_field(field, value.to_string())
    }
}
