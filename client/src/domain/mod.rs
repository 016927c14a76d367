//! Domain primitives, use cases, and the session client.
//!
//! Purpose: keep the grading client's behaviour independent of how HTTP is
//! spoken, where credentials live, or how the user is moved between screens.
//! Those concerns sit behind the traits in [`ports`].
//!
//! Public surface:
//! - AccessToken / RefreshToken / CredentialPair: bearer credentials.
//! - LoginCredentials / Registration: validated form input.
//! - ApiError / FormError: failures and their display text.
//! - SessionClient (in [`session_client`]): authenticated dispatch with a
//!   single refresh-and-replay on 401.
//! - SessionService, DirectionsBoard, EventsService: use cases.

pub mod auth;
pub mod credentials;
pub mod directions;
pub mod directions_service;
pub mod error;
pub mod events;
pub mod events_service;
pub mod grading_api;
pub mod ports;
pub mod session;
pub mod session_client;
pub mod session_service;

pub use self::auth::{CredentialsValidationError, LoginCredentials, Registration};
pub use self::credentials::{AccessToken, CredentialPair, RefreshToken, TokenValidationError};
pub use self::directions::{Direction, NewDirection};
pub use self::directions_service::DirectionsBoard;
pub use self::error::{
    ApiError, ErrorBody, FieldErrors, FormError, NETWORK_ERROR_MESSAGE,
    NON_FIELD_ERRORS,
};
pub use self::events::{Event, NewEvent};
pub use self::events_service::EventsService;
pub use self::grading_api::{GradingApi, RegisteredAccount};
pub use self::session::{CurrentUser, Role, SessionState};
pub use self::session_client::SessionClient;
pub use self::session_service::{GuardOutcome, LoginOutcome, SessionService};

/// Convenient result alias for use cases.
///
/// # Examples
/// ```
/// use grading_admin::domain::{ApiError, ApiResult};
///
/// fn fetch() -> ApiResult<u8> {
///     Err(ApiError::Network { message: "offline".into() })
/// }
/// assert!(fetch().is_err());
/// ```
pub type ApiResult<T> = Result<T, ApiError>;
