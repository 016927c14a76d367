//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed transport and the token refresh client
//! - **storage**: file-backed credential store using `cap-std`
//!
//! Adapters are thin translators between domain types and wire or disk
//! representations. They contain no business logic.

pub mod http;
pub mod storage;
