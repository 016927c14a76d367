//! Credential storage adapters.

mod file_store;

pub use file_store::{FileCredentialStore, CREDENTIALS_FILE};
