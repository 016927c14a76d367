//! Token refresher that calls the refresh endpoint over a bare transport.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::grading_api::TOKEN_REFRESH_PATH;
use crate::domain::ports::{ApiRequest, HttpTransport, RefreshError, TokenRefresher, TransportError};
use crate::domain::{AccessToken, RefreshToken};

#[derive(Deserialize)]
struct RefreshResponseDto {
    access: String,
}

/// Refresher posting `{"refresh": ...}` to `token/refresh/`.
///
/// The transport must not be the session client, otherwise a rejected refresh
/// would re-enter the refresh interceptor.
pub struct HttpTokenRefresher {
    transport: Arc<dyn HttpTransport>,
}

impl HttpTokenRefresher {
    /// Wrap a bare transport.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh: &RefreshToken) -> Result<AccessToken, RefreshError> {
        let request = ApiRequest::post(TOKEN_REFRESH_PATH, json!({ "refresh": refresh.expose() }));
        let response = self
            .transport
            .send(&request)
            .await
            .map_err(map_refresh_error)?;
        let dto: RefreshResponseDto = response.json().map_err(map_refresh_error)?;
        let access = AccessToken::new(dto.access)
            .map_err(|error| RefreshError::decode(format!("access token: {error}")))?;
        debug!("access token refreshed");
        Ok(access)
    }
}

fn map_refresh_error(error: TransportError) -> RefreshError {
    match error {
        TransportError::Status { status, .. } => {
            warn!(status, "refresh token rejected");
            RefreshError::rejected(status)
        }
        TransportError::Network { message } | TransportError::Timeout { message } => {
            RefreshError::network(message)
        }
        TransportError::Decode { message } => RefreshError::decode(message),
    }
}
