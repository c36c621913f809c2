//! Durable credential store for the Gemini API key.
//!
//! A single named credential kept in a YAML file under the data
//! directory. No encryption, no rotation; the file is created on first
//! `set`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const GEMINI_KEY_NAME: &str = "gemini_api_key";
const STORE_FILE: &str = "credentials.yaml";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Capability the orchestration layer depends on instead of a global
/// store, so tests can substitute an in-memory provider.
pub trait CredentialProvider: Send + Sync {
    fn gemini_key(&self) -> Option<String>;

    fn has_keys(&self) -> bool {
        self.gemini_key().is_some()
    }
}

/// File-backed credential store.
#[derive(Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    credentials: BTreeMap<String, String>,
}

impl KeyStore {
    /// Store rooted at `data_dir/credentials.yaml`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(STORE_FILE),
        }
    }

    fn read(&self) -> Result<StoreFile, StoreError> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    fn write(&self, file: &StoreFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(file)?)?;
        Ok(())
    }

    /// Retrieve the Gemini API key, if one has been configured.
    pub fn get_gemini_key(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .read()?
            .credentials
            .get(GEMINI_KEY_NAME)
            .filter(|k| !k.trim().is_empty())
            .cloned())
    }

    /// Persist the Gemini API key, replacing any previous value.
    pub fn set_gemini_key(&self, key: &str) -> Result<(), StoreError> {
        let mut file = self.read()?;
        file.credentials
            .insert(GEMINI_KEY_NAME.to_string(), key.to_string());
        self.write(&file)
    }

    /// True iff a non-empty key has been set.
    pub fn has_keys(&self) -> Result<bool, StoreError> {
        Ok(self.get_gemini_key()?.is_some())
    }
}

impl CredentialProvider for KeyStore {
    fn gemini_key(&self) -> Option<String> {
        self.get_gemini_key().ok().flatten()
    }
}
