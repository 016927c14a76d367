//! Driven port for the session credential store.
//!
//! The store is the only shared mutable state of the client. Any caller may
//! read or overwrite it; concurrent writers follow last-write-wins.

use std::sync::Mutex;

use crate::domain::{AccessToken, CredentialPair, RefreshToken};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store implementations.
    pub enum CredentialStoreError {
        /// The backing storage could not be read or written.
        Io { message: String } =>
            "credential storage failed: {message}",
        /// Stored credentials could not be decoded.
        Corrupt { message: String } =>
            "stored credentials are corrupt: {message}",
        /// An access token was written while no credential pair is stored.
        NoSession =>
            "no credential pair is stored",
    }
}

/// Read/write access to the persisted credential pair.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Current access token, if logged in.
    fn access_token(&self) -> Result<Option<AccessToken>, CredentialStoreError>;

    /// Current refresh token, if logged in.
    fn refresh_token(&self) -> Result<Option<RefreshToken>, CredentialStoreError>;

    /// Replace any stored pair with `pair`.
    fn set_credentials(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError>;

    /// Replace the access token of the stored pair, keeping its refresh token.
    ///
    /// Fails with [`CredentialStoreError::NoSession`] when nothing is stored.
    fn set_access_token(&self, access: &AccessToken) -> Result<(), CredentialStoreError>;

    /// Remove the stored pair. Clearing an empty store succeeds.
    fn clear_credentials(&self) -> Result<(), CredentialStoreError>;
}

/// Process-local store used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    pair: Mutex<Option<CredentialPair>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `pair`.
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: Mutex::new(Some(pair)),
        }
    }

    /// Snapshot of the stored pair.
    pub fn snapshot(&self) -> Result<Option<CredentialPair>, CredentialStoreError> {
        self.with_lock(|pair| pair.clone())
    }

    fn with_lock<T>(
        &self,
        f: impl FnOnce(&mut Option<CredentialPair>) -> T,
    ) -> Result<T, CredentialStoreError> {
        let mut guard = self
            .pair
            .lock()
            .map_err(|_| CredentialStoreError::io("credential store lock poisoned"))?;
        Ok(f(&mut guard))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn access_token(&self) -> Result<Option<AccessToken>, CredentialStoreError> {
        self.with_lock(|pair| pair.as_ref().map(|p| p.access().clone()))
    }

    fn refresh_token(&self) -> Result<Option<RefreshToken>, CredentialStoreError> {
        self.with_lock(|pair| pair.as_ref().map(|p| p.refresh().clone()))
    }

    fn set_credentials(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        self.with_lock(|stored| *stored = Some(pair.clone()))
    }

    fn set_access_token(&self, access: &AccessToken) -> Result<(), CredentialStoreError> {
        self.with_lock(|stored| match stored.take() {
            Some(pair) => {
                *stored = Some(pair.with_access(access.clone()));
                Ok(())
            }
            None => Err(CredentialStoreError::no_session()),
        })?
    }

    fn clear_credentials(&self) -> Result<(), CredentialStoreError> {
        self.with_lock(|stored| *stored = None)
    }
}
