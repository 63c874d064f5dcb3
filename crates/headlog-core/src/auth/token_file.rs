use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::credentials::{non_empty, CredentialError, CredentialStore};

/// Token file name in the data directory
const TOKEN_FILE: &str = "token.json";

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// File-backed store for hosts without a usable keychain.
///
/// The file is created with owner-only permissions on Unix and replaced
/// atomically, so no reader ever sees a partial or world-readable token.
pub struct FileTokenStore {
    data_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE)
    }
}

impl CredentialStore for FileTokenStore {
    fn read(&self) -> Option<String> {
        let path = self.path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to read token file");
                return None;
            }
        };

        match serde_json::from_str::<TokenFile>(&contents) {
            Ok(file) => non_empty(file.token),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Ignoring corrupt token file");
                None
            }
        }
    }

    fn write(&self, token: &str) -> Result<(), CredentialError> {
        let path = self.path();
        std::fs::create_dir_all(&self.data_dir)?;
        let contents = serde_json::to_string_pretty(&TokenFile {
            token: token.to_string(),
        })?;

        // Created owner-only, then renamed over the old file in one step
        let mut tmp = NamedTempFile::new_in(&self.data_dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "Token file written");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
