//! File-backed credential store.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::entities::{AccessToken, UserId};
use crate::domain::errors::StoreError;
use crate::domain::ports::CredentialStorePort;

/// Credential file name inside the data directory.
pub const CREDENTIALS_FILE_NAME: &str = "tokens.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    tokens: BTreeMap<String, String>,
}

/// Stores user tokens in a TOML file.
///
/// The whole mapping is held in memory and the file is rewritten through a
/// temp file and rename on every mutation. A failed write leaves both the
/// file and the in-memory mapping as they were.
pub struct TomlCredentialStore {
    path: PathBuf,
    tokens: RwLock<BTreeMap<String, String>>,
}

impl TomlCredentialStore {
    /// Opens the store in `data_dir`, creating directory and file if missing.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or read, or is malformed.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|e| StoreError::io(data_dir, e))?;
        let path = data_dir.join(CREDENTIALS_FILE_NAME);

        let tokens = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            toml::from_str::<CredentialFile>(&content)
                .map_err(|source| StoreError::Malformed {
                    path: path.clone(),
                    source,
                })?
                .tokens
        } else {
            info!(path = %path.display(), "Creating credential file");
            let empty = BTreeMap::new();
            write_file(&path, &empty)?;
            empty
        };

        debug!(path = %path.display(), users = tokens.len(), "Credential store opened");
        Ok(Self {
            path,
            tokens: RwLock::new(tokens),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of stored tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    /// Returns whether no token is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }
}

impl CredentialStorePort for TomlCredentialStore {
    fn save(&self, user_id: &UserId, token: &AccessToken) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write();
        let previous = tokens.insert(user_id.to_string(), token.as_str().to_string());

        if let Err(e) = write_file(&self.path, &tokens) {
            match previous {
                Some(old) => tokens.insert(user_id.to_string(), old),
                None => tokens.remove(user_id.as_str()),
            };
            return Err(e);
        }

        debug!(user_id = %user_id, "Token saved");
        Ok(())
    }

    fn get(&self, user_id: &UserId) -> Option<AccessToken> {
        self.tokens
            .read()
            .get(user_id.as_str())
            .map(AccessToken::new_unchecked)
    }

    fn delete(&self, user_id: &UserId) -> Result<bool, StoreError> {
        let mut tokens = self.tokens.write();
        let Some(previous) = tokens.remove(user_id.as_str()) else {
            return Ok(false);
        };

        if let Err(e) = write_file(&self.path, &tokens) {
            tokens.insert(user_id.to_string(), previous);
            return Err(e);
        }

        debug!(user_id = %user_id, "Token deleted");
        Ok(true)
    }
}

fn write_file(path: &Path, tokens: &BTreeMap<String, String>) -> Result<(), StoreError> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        tokens: &'a BTreeMap<String, String>,
    }

    let content = toml::to_string_pretty(&Borrowed { tokens })?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| StoreError::io(temp_file.path(), e))?;
    temp_file
        .persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}
