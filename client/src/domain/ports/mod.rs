//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_store;
mod http_transport;
mod navigator;
mod token_refresher;

#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError, InMemoryCredentialStore};
#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{
    ApiRequest, ApiResponse, AUTHORIZATION, HttpTransport, Method, TransportError,
    UNAUTHORIZED_STATUS,
};
#[cfg(test)]
pub use navigator::MockNavigator;
pub use navigator::{Destination, DirectionId, Navigator, RecordingNavigator};
#[cfg(test)]
pub use token_refresher::MockTokenRefresher;
pub use token_refresher::{RefreshError, TokenRefresher};
