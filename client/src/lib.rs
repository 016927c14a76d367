//! Grading admin client library.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the session client,
//! use cases, and port traits; [`outbound`] adapts them to reqwest and the
//! filesystem; [`inbound`] exposes them as a command-line surface.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use config::ClientSettings;
