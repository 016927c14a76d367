//! Driven port for renewing an access token.
//!
//! Implementations must call the refresh endpoint directly, bypassing the
//! session client, so a rejected refresh can never re-enter the interceptor.

use async_trait::async_trait;

use crate::domain::{AccessToken, RefreshToken};

use super::define_port_error;

define_port_error! {
    /// Reasons a refresh attempt failed.
    pub enum RefreshError {
        /// No refresh token was stored.
        MissingRefreshToken =>
            "no refresh token is stored",
        /// The API rejected the refresh token.
        Rejected { status: u16 } =>
            "refresh rejected with status {status}",
        /// The refresh call never produced a response.
        Network { message: String } =>
            "refresh transport failed: {message}",
        /// The refresh response did not carry a usable access token.
        Decode { message: String } =>
            "refresh response decode failed: {message}",
    }
}

/// Exchange a refresh token for a new access token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Call `token/refresh/` with `refresh` and return the new access token.
    async fn refresh(&self, refresh: &RefreshToken) -> Result<AccessToken, RefreshError>;
}
