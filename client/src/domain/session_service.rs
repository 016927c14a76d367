//! Login, logout, registration, and role-based route guards.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::grading_api::{GradingApi, RegisteredAccount};
use crate::domain::ports::{CredentialStore, Destination, Navigator};
use crate::domain::{
    ApiError, CurrentUser, LoginCredentials, Registration, Role, SessionState,
};

/// Fallback message for failed logins.
pub const LOGIN_FAILED: &str = "Invalid credentials. Please try again.";
/// Fallback message for failed registrations.
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
/// Message logged when a guard cannot identify the user.
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";

/// Result of a route guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The user may stay; their identity is attached.
    Allow(CurrentUser),
    /// The user was sent elsewhere.
    Redirect(Destination),
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Identity reported by `me/` right after login.
    pub user: CurrentUser,
    /// Where the user was sent.
    pub destination: Destination,
}

/// Session use cases shared by every entry point.
pub struct SessionService {
    api: Arc<GradingApi>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionService {
    /// Wire the service to its collaborators.
    pub fn new(
        api: Arc<GradingApi>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            store,
            navigator,
        }
    }

    /// Current session state as seen by route guards.
    pub fn state(&self) -> SessionState {
        match self.store.access_token() {
            Ok(access) => SessionState::from_access_token(access.as_ref()),
            Err(error) => {
                warn!(%error, "access token unreadable; treating session as anonymous");
                SessionState::Anonymous
            }
        }
    }

    /// Exchange credentials, store the pair, and land on the role's area.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let credentials = LoginCredentials::try_from_parts(username, password)?;
        let pair = self.api.obtain_token(&credentials).await?;
        self.store.set_credentials(&pair)?;

        let user = self.api.me().await?;
        let destination = user.role.landing();
        info!(
            username = credentials.username(),
            role = %user.role,
            %destination,
            "logged in"
        );
        self.navigator.navigate(destination);
        Ok(LoginOutcome { user, destination })
    }

    /// Forget the stored credentials and return to the login entry point.
    pub fn logout(&self) -> Result<(), ApiError> {
        let cleared = self.store.clear_credentials();
        self.navigator.navigate(Destination::Login);
        cleared?;
        info!("logged out");
        Ok(())
    }

    /// Create an account and send the user to log in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<RegisteredAccount, ApiError> {
        let registration = Registration::try_from_parts(username, password, confirmation)?;
        let account = self.api.register(&registration).await?;
        info!(username = %account.username, "account registered");
        self.navigator.navigate(Destination::Login);
        Ok(account)
    }

    /// Identity of the signed-in user.
    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.api.me().await
    }

    /// Guard for the admin area: anonymous users go to login, non-admins to
    /// the dashboard.
    pub async fn guard_admin_area(&self) -> GuardOutcome {
        if self.state() == SessionState::Anonymous {
            return self.redirect(Destination::Login);
        }
        match self.api.me().await {
            Ok(user) if user.role == Role::Admin => GuardOutcome::Allow(user),
            Ok(user) => {
                info!(role = %user.role, "non-admin redirected from admin area");
                self.redirect(Destination::Dashboard)
            }
            Err(error) => {
                warn!(%error, reason = AUTHENTICATION_FAILED, "route guard could not identify user");
                self.redirect(Destination::Login)
            }
        }
    }

    /// Guard for the generic dashboard: admins are sent to their area.
    pub async fn guard_dashboard(&self) -> GuardOutcome {
        match self.api.me().await {
            Ok(user) if user.role == Role::Admin => self.redirect(Destination::AdminDirections),
            Ok(user) => GuardOutcome::Allow(user),
            Err(error) => {
                warn!(%error, reason = AUTHENTICATION_FAILED, "route guard could not identify user");
                self.redirect(Destination::Login)
            }
        }
    }

    /// Entry page: always continue to login.
    pub fn welcome(&self) -> Destination {
        self.navigator.navigate(Destination::Login);
        Destination::Login
    }

    fn redirect(&self, destination: Destination) -> GuardOutcome {
        self.navigator.navigate(destination);
        GuardOutcome::Redirect(destination)
    }
}

/// Display text for a failed registration: the API's reason, else the first
/// username or password message, else a generic message.
pub fn registration_error_message(error: &ApiError) -> String {
    if let ApiError::InvalidInput { .. } = error {
        return error.display_message(REGISTRATION_FAILED);
    }
    if let Some(detail) = error.detail() {
        return detail.to_owned();
    }
    error
        .field_errors()
        .and_then(|fields| {
            ["username", "password"]
                .into_iter()
                .find_map(|field| fields.get(field).and_then(|messages| messages.first()))
        })
        .cloned()
        .unwrap_or_else(|| error.display_message(REGISTRATION_FAILED))
}
