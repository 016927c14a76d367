//! HTTP outbound adapters.
//!
//! This module provides the reqwest implementation of the `HttpTransport`
//! port and a token refresher that speaks to the refresh endpoint over a bare
//! transport.

mod refresher;
mod transport;

pub use refresher::HttpTokenRefresher;
pub use transport::{normalise_base_url, ReqwestTransport};
