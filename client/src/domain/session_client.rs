//! Session client: credential attachment plus one-shot token refresh.
//!
//! The client is an explicit stack of dispatch layers composed once at
//! construction time:
//!
//! ```text
//! with_auth_refresh(with_bearer_auth(base_dispatch(transport)))
//! ```
//!
//! - [`BearerAuth`] reads the access token from the credential store and
//!   attaches `Authorization: Bearer <access>` when one is present.
//! - [`AuthRefresh`] reacts to an HTTP 401 on a first attempt by refreshing
//!   the access token once and replaying the request with the new token. If
//!   the refresh fails the stored credentials are cleared, the user is sent to
//!   the login entry point, and the original failure is returned.
//!
//! The attempt number travels with each dispatch as an [`Attempt`] value, so
//! a replayed request can never trigger a second refresh.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::AccessToken;
use crate::domain::ports::{
    ApiRequest, ApiResponse, AUTHORIZATION, CredentialStore, Destination, HttpTransport,
    Navigator, RefreshError, TokenRefresher, TransportError,
};

/// Number of automatic replays allowed after a credential refresh.
pub const MAX_REFRESH_RETRIES: u8 = 1;

/// Position of a dispatch within one logical call.
///
/// # Examples
/// ```
/// use grading_admin::domain::session_client::Attempt;
///
/// let first = Attempt::INITIAL;
/// assert!(!first.is_retry());
/// assert!(first.next().is_retry());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Attempt(u8);

impl Attempt {
    /// The caller's original dispatch.
    pub const INITIAL: Self = Self(0);

    /// Attempt following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Whether this dispatch replays an earlier one.
    pub fn is_retry(self) -> bool {
        self.0 > 0
    }

    /// Whether a failed dispatch at this attempt may still refresh and replay.
    pub fn may_refresh(self) -> bool {
        self.0 < MAX_REFRESH_RETRIES
    }

    /// Zero-based attempt number.
    pub fn number(self) -> u8 {
        self.0
    }
}

/// One layer of the dispatch stack.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Dispatch `request` as attempt `attempt` of a logical call.
    async fn dispatch(
        &self,
        request: ApiRequest,
        attempt: Attempt,
    ) -> Result<ApiResponse, TransportError>;
}

/// Innermost layer: hand the request to the transport unchanged.
pub struct BaseDispatch {
    transport: Arc<dyn HttpTransport>,
}

/// Wrap a transport as the innermost dispatch layer.
pub fn base_dispatch(transport: Arc<dyn HttpTransport>) -> BaseDispatch {
    BaseDispatch { transport }
}

#[async_trait]
impl Dispatch for BaseDispatch {
    async fn dispatch(
        &self,
        request: ApiRequest,
        attempt: Attempt,
    ) -> Result<ApiResponse, TransportError> {
        debug!(
            method = %request.method(),
            path = request.path(),
            attempt = attempt.number(),
            "dispatching api request"
        );
        self.transport.send(&request).await
    }
}

/// Pre-send layer attaching the stored access token.
pub struct BearerAuth<D> {
    inner: D,
    store: Arc<dyn CredentialStore>,
}

/// Attach stored bearer credentials to every request passing through `inner`.
pub fn with_bearer_auth<D: Dispatch>(inner: D, store: Arc<dyn CredentialStore>) -> BearerAuth<D> {
    BearerAuth { inner, store }
}

impl<D> BearerAuth<D> {
    fn authorise(&self, request: ApiRequest, attempt: Attempt) -> ApiRequest {
        // A replay already carries the token minted for it.
        if attempt.is_retry() && request.header(AUTHORIZATION).is_some() {
            return request;
        }
        match self.store.access_token() {
            Ok(Some(access)) => request.with_header(AUTHORIZATION, access.bearer_header()),
            Ok(None) => request,
            Err(error) => {
                warn!(%error, path = request.path(), "access token unreadable; sending unauthenticated");
                request
            }
        }
    }
}

#[async_trait]
impl<D: Dispatch> Dispatch for BearerAuth<D> {
    async fn dispatch(
        &self,
        request: ApiRequest,
        attempt: Attempt,
    ) -> Result<ApiResponse, TransportError> {
        let request = self.authorise(request, attempt);
        self.inner.dispatch(request, attempt).await
    }
}

/// Post-receive layer that refreshes an expired access token once.
pub struct AuthRefresh<D> {
    inner: D,
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    navigator: Arc<dyn Navigator>,
}

/// Refresh-and-replay on authorisation failures of requests sent via `inner`.
pub fn with_auth_refresh<D: Dispatch>(
    inner: D,
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    navigator: Arc<dyn Navigator>,
) -> AuthRefresh<D> {
    AuthRefresh {
        inner,
        store,
        refresher,
        navigator,
    }
}

impl<D> AuthRefresh<D> {
    async fn renew_access(&self) -> Result<AccessToken, RefreshError> {
        let refresh = match self.store.refresh_token() {
            Ok(Some(refresh)) => refresh,
            Ok(None) => return Err(RefreshError::missing_refresh_token()),
            Err(error) => {
                warn!(%error, "refresh token unreadable");
                return Err(RefreshError::missing_refresh_token());
            }
        };

        let access = self.refresher.refresh(&refresh).await?;
        if let Err(error) = self.store.set_access_token(&access) {
            // The replay still carries the new token explicitly.
            warn!(%error, "failed to persist refreshed access token");
        }
        Ok(access)
    }

    fn end_session(&self) {
        if let Err(error) = self.store.clear_credentials() {
            warn!(%error, "failed to clear credentials after refresh failure");
        }
        self.navigator.navigate(Destination::Login);
    }
}

#[async_trait]
impl<D: Dispatch> Dispatch for AuthRefresh<D> {
    async fn dispatch(
        &self,
        request: ApiRequest,
        attempt: Attempt,
    ) -> Result<ApiResponse, TransportError> {
        let failure = match self.inner.dispatch(request.clone(), attempt).await {
            Ok(response) => return Ok(response),
            Err(failure) => failure,
        };

        if !failure.is_unauthorized() || !attempt.may_refresh() {
            return Err(failure);
        }

        match self.renew_access().await {
            Ok(access) => {
                info!(
                    path = request.path(),
                    attempt = attempt.number(),
                    "access token refreshed; replaying request"
                );
                let replay = request.with_header(AUTHORIZATION, access.bearer_header());
                self.dispatch(replay, attempt.next()).await
            }
            Err(error) => {
                warn!(%error, path = request.path(), "token refresh failed; ending session");
                self.end_session();
                Err(failure)
            }
        }
    }
}

/// Full dispatch stack used by the session client.
pub type SessionPipeline = AuthRefresh<BearerAuth<BaseDispatch>>;

/// Process-wide entry point for authenticated API calls.
pub struct SessionClient {
    pipeline: SessionPipeline,
}

impl SessionClient {
    /// Compose the dispatch stack over `transport`.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn TokenRefresher>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let pipeline = with_auth_refresh(
            with_bearer_auth(base_dispatch(transport), Arc::clone(&store)),
            store,
            refresher,
            navigator,
        );
        Self { pipeline }
    }

    /// Send one logical call, refreshing credentials at most once.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.pipeline.dispatch(request, Attempt::INITIAL).await
    }
}

#[async_trait]
impl Dispatch for SessionClient {
    async fn dispatch(
        &self,
        request: ApiRequest,
        attempt: Attempt,
    ) -> Result<ApiResponse, TransportError> {
        self.pipeline.dispatch(request, attempt).await
    }
}
