//! Persistence of the session token (the signed-in email).

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use helpdesk_sdk::HelpdeskError;
use parking_lot::Mutex;

/// Where the session token lives between runs.
///
/// Exactly one value is kept. Only [`SessionContext`](super::SessionContext)
/// writes through this trait; everything else reads the identity instead.
pub trait SessionStore: Send + Sync {
    /// # Errors
    /// `SessionStorage` when the backing medium cannot be read.
    fn load(&self) -> Result<Option<String>, HelpdeskError>;

    /// # Errors
    /// `SessionStorage` when the token cannot be written.
    fn save(&self, email: &str) -> Result<(), HelpdeskError>;

    /// Remove the token. Clearing an absent token is not an error.
    ///
    /// # Errors
    /// `SessionStorage` when the token exists but cannot be removed.
    fn clear(&self) -> Result<(), HelpdeskError>;
}

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> HelpdeskError {
    HelpdeskError::SessionStorage {
        reason: format!("cannot {action} {}: {err}", path.display()),
    }
}

/// Token kept in a single file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>, HelpdeskError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &self.path, e)),
        }
    }

    fn save(&self, email: &str) -> Result<(), HelpdeskError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| storage_error("create", dir, e))?;

        let mut temp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| storage_error("stage", dir, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| storage_error("restrict", temp.path(), e))?;
        }

        temp.write_all(email.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| storage_error("write", temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| storage_error("replace", &self.path, e.error))?;

        tracing::debug!(path = %self.path.display(), "session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), HelpdeskError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session token removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, e)),
        }
    }
}

/// In-process token, for tests and embedding hosts with their own storage.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(email: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(email.into())),
        }
    }

    /// Current value without going through the trait.
    #[must_use]
    pub fn peek(&self) -> Option<String> {
        self.token.lock().clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>, HelpdeskError> {
        Ok(self.peek())
    }

    fn save(&self, email: &str) -> Result<(), HelpdeskError> {
        *self.token.lock() = Some(email.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), HelpdeskError> {
        self.token.lock().take();
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file_is_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session"));
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session"));

        store.save("ana@x.io").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("ana@x.io"));

        store.save("bea@x.io").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("bea@x.io"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_blank_file_is_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(FileSessionStore::new(&path).load().unwrap(), None);

        fs::write(&path, "ana@x.io\n").unwrap();
        assert_eq!(
            FileSessionStore::new(&path).load().unwrap().as_deref(),
            Some("ana@x.io")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session"));
        store.save("ana@x.io").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::with_token("ana@x.io");
        assert_eq!(store.load().unwrap().as_deref(), Some("ana@x.io"));
        store.clear().unwrap();
        assert_eq!(store.peek(), None);
    }
}
