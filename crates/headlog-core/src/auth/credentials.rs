use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;
use tracing::{debug, warn};

/// Keychain service name
const SERVICE_NAME: &str = "headlog";

/// The single secure-storage key holding the session token
pub const TOKEN_KEY: &str = "token";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode token file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable single-slot storage for the session token.
///
/// `read` never fails: anything that prevents reading a token is reported as
/// "absent". `clear` on an empty store is a no-op.
pub trait CredentialStore: Send + Sync {
    fn read(&self) -> Option<String>;

    /// Persist `token`, replacing any previous value
    fn write(&self, token: &str) -> Result<(), CredentialError>;

    fn clear(&self) -> Result<(), CredentialError>;
}

/// Treat blank stored values the same as a missing one
pub(crate) fn non_empty(token: String) -> Option<String> {
    if token.trim().is_empty() {
        None
    } else {
        Some(token)
    }
}

/// OS keychain backed store
pub struct KeyringStore {
    entry: Entry,
}

impl KeyringStore {
    pub fn new() -> Result<Self, CredentialError> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_KEY)?;
        Ok(Self { entry })
    }
}

impl CredentialStore for KeyringStore {
    fn read(&self) -> Option<String> {
        match self.entry.get_password() {
            Ok(token) => non_empty(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read token from keychain");
                None
            }
        }
    }

    fn write(&self, token: &str) -> Result<(), CredentialError> {
        self.entry.set_password(token)?;
        debug!("Token stored in keychain");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match self.entry.delete_credential() {
            Ok(()) => {
                debug!("Token removed from keychain");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    token: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn read(&self) -> Option<String> {
        let slot = self.token.lock().unwrap_or_else(|e| e.into_inner());
        slot.clone().and_then(non_empty)
    }

    fn write(&self, token: &str) -> Result<(), CredentialError> {
        let mut slot = self.token.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        let mut slot = self.token.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_write_replaces() {
        let store = MemoryStore::new();
        assert_eq!(store.read(), None);

        store.write("first").unwrap();
        store.write("second").unwrap();
        assert_eq!(store.read().as_deref(), Some("second"));
    }

    #[test]
    fn test_memory_store_clear_is_idempotent() {
        let store = MemoryStore::with_token("abc");

        store.clear().unwrap();
        assert_eq!(store.read(), None);

        store.clear().unwrap();
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_blank_token_reads_as_absent() {
        let store = MemoryStore::with_token("   ");
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_keyring_store_with_mock_backend() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let store = KeyringStore::new().unwrap();

        // Clearing before anything was written is not an error
        store.clear().unwrap();
        assert_eq!(store.read(), None);

        store.write("abc").unwrap();
        assert_eq!(store.read().as_deref(), Some("abc"));

        store.clear().unwrap();
        assert_eq!(store.read(), None);
        store.clear().unwrap();
        assert_eq!(store.read(), None);
    }
}
