//! Bearer-token storage.
//!
//! The HTTP client reads the token before every request; login and
//! registration write it; logout and the 401 handler clear it. Effects run on
//! a multi-threaded runtime, so every store is internally synchronized.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "jwtToken";

/// Errors raised while persisting credentials
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The backing file could not be read or written
    #[error("Credential storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The backing file is not a JSON object
    #[error("Credential file is malformed: {0}")]
    Format(String),
}

/// Persistent holder of the bearer token
pub trait CredentialStore: Send + Sync {
    /// Current token, if one is stored
    fn get(&self) -> Option<String>;

    /// Store `token`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the token cannot be persisted.
    fn set(&self, token: &str) -> Result<(), CredentialError>;

    /// Remove the stored token
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the removal cannot be persisted.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token store backed by a small JSON document on disk
///
/// The file holds `{ "jwtToken": "<token>" }`; other keys found in it are
/// preserved on rewrite. Reads are served from memory, writes go to a
/// sibling temp file that is then renamed over the original.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    document: RwLock<Map<String, Value>>,
}

impl FileCredentialStore {
    /// Open (or prepare to create) the store at `path`
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if an existing file cannot be read or is
    /// not a JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    return Err(CredentialError::Format(format!(
                        "expected an object, found {other}"
                    )));
                },
                Err(e) => return Err(CredentialError::Format(e.to_string())),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), has_token = document.contains_key(TOKEN_KEY), "Opened credential file");

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, document: &Map<String, Value>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(document)
            .map_err(|e| CredentialError::Format(e.to_string()))?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, text)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        self.document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        let mut document = self.document.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = document.clone();
        next.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.persist(&next)?;
        *document = next;
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        let mut document = self.document.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = document.clone();
        if next.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.persist(&next)?;
        *document = next;
        Ok(())
    }
}
