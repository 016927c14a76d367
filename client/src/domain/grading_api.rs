//! Typed calls against the grading REST API.
//!
//! Authenticated calls go through the [`SessionClient`] stack. The token
//! exchange and account creation use the bare transport so a rejected login
//! never reaches the refresh interceptor.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::domain::ports::{ApiRequest, HttpTransport};
use crate::domain::session_client::SessionClient;
use crate::domain::{
    AccessToken, ApiError, CredentialPair, CurrentUser, Direction, Event, LoginCredentials,
    NewDirection, NewEvent, RefreshToken, Registration,
};

/// Path of the token exchange endpoint.
pub const TOKEN_PATH: &str = "token/";
/// Path of the token refresh endpoint.
pub const TOKEN_REFRESH_PATH: &str = "token/refresh/";
/// Path of the current-user endpoint.
pub const ME_PATH: &str = "me/";
/// Path of the directions collection.
pub const DIRECTIONS_PATH: &str = "directions/";
/// Path of the events collection.
pub const EVENTS_PATH: &str = "events/";
/// Path of the registration endpoint.
pub const REGISTER_PATH: &str = "register/";

#[derive(Deserialize)]
struct TokenPairDto {
    access: String,
    refresh: String,
}

/// Account returned by `register/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredAccount {
    /// New user id.
    pub id: i64,
    /// Login name of the new account.
    pub username: String,
}

/// Grading API facade.
pub struct GradingApi {
    session: Arc<SessionClient>,
    anonymous: Arc<dyn HttpTransport>,
}

impl GradingApi {
    /// Build the facade from the session stack and the bare transport.
    pub fn new(session: Arc<SessionClient>, anonymous: Arc<dyn HttpTransport>) -> Self {
        Self { session, anonymous }
    }

    /// Exchange username and password for a credential pair.
    pub async fn obtain_token(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<CredentialPair, ApiError> {
        let request = ApiRequest::post(TOKEN_PATH, credentials.to_payload());
        let response = self.anonymous.send(&request).await?;
        let dto: TokenPairDto = response.json()?;
        let access = AccessToken::new(dto.access).map_err(|err| ApiError::Decode {
            message: format!("access token: {err}"),
        })?;
        let refresh = RefreshToken::new(dto.refresh).map_err(|err| ApiError::Decode {
            message: format!("refresh token: {err}"),
        })?;
        Ok(CredentialPair::new(access, refresh))
    }

    /// Create an account.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<RegisteredAccount, ApiError> {
        let request = ApiRequest::post(REGISTER_PATH, registration.credentials().to_payload());
        let response = self.anonymous.send(&request).await?;
        Ok(response.json()?)
    }

    /// Identify the current user.
    pub async fn me(&self) -> Result<CurrentUser, ApiError> {
        let response = self.session.send(ApiRequest::get(ME_PATH)).await?;
        Ok(response.json()?)
    }

    /// List directions, optionally filtered by a name fragment.
    ///
    /// A blank search is not sent.
    pub async fn list_directions(&self, search: Option<&str>) -> Result<Vec<Direction>, ApiError> {
        let mut request = ApiRequest::get(DIRECTIONS_PATH);
        if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
            request = request.with_query("search", term);
        }
        let response = self.session.send(request).await?;
        let directions: Vec<Direction> = response.json()?;
        debug!(count = directions.len(), "directions fetched");
        Ok(directions)
    }

    /// Create a direction.
    pub async fn create_direction(&self, direction: &NewDirection) -> Result<Direction, ApiError> {
        let request = ApiRequest::post(DIRECTIONS_PATH, direction.to_payload());
        let response = self.session.send(request).await?;
        Ok(response.json()?)
    }

    /// Create an event.
    pub async fn create_event(&self, event: &NewEvent) -> Result<Event, ApiError> {
        let request = ApiRequest::post(EVENTS_PATH, event.to_payload());
        let response = self.session.send(request).await?;
        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        ApiResponse, InMemoryCredentialStore, MockHttpTransport, MockNavigator,
        MockTokenRefresher, TransportError,
    };
    use rstest::rstest;
    use serde_json::json;

    fn api(session_transport: MockHttpTransport, anonymous: MockHttpTransport) -> GradingApi {
        let session = SessionClient::new(
            Arc::new(session_transport),
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(MockTokenRefresher::new()),
            Arc::new(MockNavigator::new()),
        );
        GradingApi::new(Arc::new(session), Arc::new(anonymous))
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("   "), None)]
    #[case(Some("  math "), Some("math"))]
    #[tokio::test]
    async fn search_term_is_trimmed_and_blank_terms_dropped(
        #[case] search: Option<&'static str>,
        #[case] expected: Option<&'static str>,
    ) {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(move |request| {
                let sent = request
                    .query()
                    .iter()
                    .find(|(key, _)| key == "search")
                    .map(|(_, value)| value.as_str());
                request.path() == DIRECTIONS_PATH && sent == expected
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!([]))));

        let directions = api(transport, MockHttpTransport::new())
            .list_directions(search)
            .await
            .expect("list succeeds");
        assert!(directions.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn token_exchange_uses_the_bare_transport() {
        let mut anonymous = MockHttpTransport::new();
        anonymous
            .expect_send()
            .withf(|request| {
                request.path() == TOKEN_PATH
                    && request.body() == Some(&json!({"username": "admin", "password": "pw"}))
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, json!({"access": "a", "refresh": "r"}))));

        let credentials = LoginCredentials::try_from_parts("admin", "pw").expect("valid");
        let pair = api(MockHttpTransport::new(), anonymous)
            .obtain_token(&credentials)
            .await
            .expect("exchange succeeds");
        assert_eq!(pair.access().expose(), "a");
        assert_eq!(pair.refresh().expose(), "r");
    }

    #[rstest]
    #[tokio::test]
    async fn blank_tokens_in_exchange_are_decode_errors() {
        let mut anonymous = MockHttpTransport::new();
        anonymous
            .expect_send()
            .returning(|_| Ok(ApiResponse::new(200, json!({"access": "", "refresh": "r"}))));

        let credentials = LoginCredentials::try_from_parts("admin", "pw").expect("valid");
        let err = api(MockHttpTransport::new(), anonymous)
            .obtain_token(&credentials)
            .await
            .expect_err("blank access token");
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn registration_failures_keep_field_messages() {
        let mut anonymous = MockHttpTransport::new();
        anonymous.expect_send().returning(|_| {
            Err(TransportError::status(
                400_u16,
                r#"{"username": ["A user with that username already exists."]}"#,
            ))
        });

        let registration = Registration::try_from_parts("taken", "pw", "pw").expect("valid");
        let err = api(MockHttpTransport::new(), anonymous)
            .register(&registration)
            .await
            .expect_err("duplicate username");
        let fields = err.field_errors().expect("fields present");
        assert_eq!(
            fields["username"],
            vec!["A user with that username already exists.".to_owned()]
        );
    }
}
