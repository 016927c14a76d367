//! File-backed credential store using a capability directory.
//!
//! The pair lives in one JSON document. Writes go to a staging file that is
//! renamed over the document, so readers see the old pair or the new pair and
//! never a mix of the two. On unix the document is readable by its owner
//! only.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[cfg(unix)]
use cap_std::fs::OpenOptionsExt;
use cap_std::{
    ambient_authority,
    fs::{Dir, OpenOptions},
};
use tracing::debug;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{AccessToken, CredentialPair, RefreshToken};

/// Name of the credential document inside the store directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";
const STAGING_FILE: &str = ".credentials.json.tmp";
#[cfg(unix)]
const DOCUMENT_MODE: u32 = 0o600;

/// Credential store persisting the pair under one directory.
pub struct FileCredentialStore {
    dir: Dir,
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Open the store rooted at `directory`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Io`] when the directory cannot be
    /// created or opened.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, CredentialStoreError> {
        let root = directory.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|error| io_error(&root, &error))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .map_err(|error| io_error(&root, &error))?;
        Ok(Self {
            dir,
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Full path of the credential document.
    pub fn document_path(&self) -> PathBuf {
        self.root.join(CREDENTIALS_FILE)
    }

    fn read_pair(&self) -> Result<Option<CredentialPair>, CredentialStoreError> {
        let raw = match self.dir.read_to_string(CREDENTIALS_FILE) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(io_error(&self.document_path(), &error)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|error| CredentialStoreError::corrupt(error.to_string()))
    }

    fn write_pair(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        let encoded = serde_json::to_vec(pair)
            .map_err(|error| CredentialStoreError::io(format!("encode credentials: {error}")))?;
        self.stage(&encoded)
            .map_err(|error| io_error(&self.root.join(STAGING_FILE), &error))?;
        self.dir
            .rename(STAGING_FILE, &self.dir, CREDENTIALS_FILE)
            .map_err(|error| io_error(&self.document_path(), &error))?;
        debug!(path = %self.document_path().display(), "credentials written");
        Ok(())
    }

    fn stage(&self, encoded: &[u8]) -> io::Result<()> {
        // A leftover staging file would keep its old mode, so start afresh.
        match self.dir.remove_file(STAGING_FILE) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(error),
        }
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(DOCUMENT_MODE);
        let mut file = self.dir.open_with(STAGING_FILE, &options)?;
        file.write_all(encoded)?;
        file.sync_all()
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CredentialStoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CredentialStoreError::io("credential store lock poisoned"))
    }
}

impl CredentialStore for FileCredentialStore {
    fn access_token(&self) -> Result<Option<AccessToken>, CredentialStoreError> {
        Ok(self.read_pair()?.map(|pair| pair.access().clone()))
    }

    fn refresh_token(&self) -> Result<Option<RefreshToken>, CredentialStoreError> {
        Ok(self.read_pair()?.map(|pair| pair.refresh().clone()))
    }

    fn set_credentials(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        let _guard = self.lock()?;
        self.write_pair(pair)
    }

    fn set_access_token(&self, access: &AccessToken) -> Result<(), CredentialStoreError> {
        let _guard = self.lock()?;
        let pair = self
            .read_pair()?
            .ok_or_else(CredentialStoreError::no_session)?;
        self.write_pair(&pair.with_access(access.clone()))
    }

    fn clear_credentials(&self) -> Result<(), CredentialStoreError> {
        let _guard = self.lock()?;
        match self.dir.remove_file(CREDENTIALS_FILE) {
            Ok(()) => {
                debug!(path = %self.document_path().display(), "credentials cleared");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(&self.document_path(), &error)),
        }
    }
}

fn io_error(path: &Path, error: &io::Error) -> CredentialStoreError {
    CredentialStoreError::io(format!("{}: {error}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        store: FileCredentialStore,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = FileCredentialStore::open(temp.path().join("nested/state")).expect("open store");
        Fixture { _temp: temp, store }
    }

    fn pair(access: &str, refresh: &str) -> CredentialPair {
        CredentialPair::new(
            AccessToken::new(access).expect("valid access"),
            RefreshToken::new(refresh).expect("valid refresh"),
        )
    }

    #[rstest]
    fn fresh_store_is_anonymous(fixture: Fixture) {
        assert!(fixture.store.access_token().expect("read").is_none());
        assert!(fixture.store.refresh_token().expect("read").is_none());
    }

    #[rstest]
    fn stored_pair_survives_reopening(fixture: Fixture) {
        fixture.store.set_credentials(&pair("a1", "r1")).expect("write");

        let reopened = FileCredentialStore::open(
            fixture
                .store
                .document_path()
                .parent()
                .expect("document has a parent"),
        )
        .expect("reopen");
        assert_eq!(reopened.access_token().expect("read").expect("access").expose(), "a1");
        assert_eq!(reopened.refresh_token().expect("read").expect("refresh").expose(), "r1");
    }

    #[rstest]
    fn replacing_access_keeps_refresh(fixture: Fixture) {
        fixture.store.set_credentials(&pair("a1", "r1")).expect("write");
        fixture
            .store
            .set_access_token(&AccessToken::new("a2").expect("valid access"))
            .expect("replace access");

        assert_eq!(fixture.store.access_token().expect("read").expect("access").expose(), "a2");
        assert_eq!(fixture.store.refresh_token().expect("read").expect("refresh").expose(), "r1");
    }

    #[rstest]
    fn replacing_access_without_session_fails(fixture: Fixture) {
        let err = fixture
            .store
            .set_access_token(&AccessToken::new("a2").expect("valid access"))
            .expect_err("nothing stored");
        assert_eq!(err, CredentialStoreError::NoSession);
    }

    #[rstest]
    fn clearing_is_idempotent(fixture: Fixture) {
        fixture.store.set_credentials(&pair("a1", "r1")).expect("write");
        fixture.store.clear_credentials().expect("first clear");
        fixture.store.clear_credentials().expect("second clear");
        assert!(fixture.store.access_token().expect("read").is_none());
    }

    #[rstest]
    fn leftover_staging_file_is_ignored(fixture: Fixture) {
        fixture.store.set_credentials(&pair("a1", "r1")).expect("write");
        fixture
            .store
            .dir
            .write(STAGING_FILE, br#"{"access":"half"#)
            .expect("write staging");

        assert_eq!(fixture.store.access_token().expect("read").expect("access").expose(), "a1");
    }

    #[cfg(unix)]
    #[rstest]
    fn document_is_private_to_its_owner(fixture: Fixture) {
        use cap_std::fs::MetadataExt;

        fixture
            .store
            .dir
            .write(STAGING_FILE, b"stale")
            .expect("write stale staging");
        fixture.store.set_credentials(&pair("a1", "r1")).expect("write");
        let mode = fixture
            .store
            .dir
            .metadata(CREDENTIALS_FILE)
            .expect("document metadata")
            .mode();
        assert_eq!(mode & 0o077, 0, "group or others can read tokens: {mode:o}");

        fixture
            .store
            .set_access_token(&AccessToken::new("a2").expect("valid access"))
            .expect("replace access");
        let mode = fixture
            .store
            .dir
            .metadata(CREDENTIALS_FILE)
            .expect("document metadata")
            .mode();
        assert_eq!(mode & 0o077, 0, "group or others can read tokens: {mode:o}");
    }

    #[rstest]
    #[case(&b"not json"[..])]
    #[case(&br#"{"access":"a1"}"#[..])]
    #[case(&br#"{"access":"","refresh":"r1"}"#[..])]
    fn damaged_documents_are_reported_as_corrupt(fixture: Fixture, #[case] contents: &[u8]) {
        fixture
            .store
            .dir
            .write(CREDENTIALS_FILE, contents)
            .expect("write document");

        let err = fixture.store.access_token().expect_err("corrupt");
        assert!(matches!(err, CredentialStoreError::Corrupt { .. }));
    }
}
