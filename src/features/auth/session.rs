//! Persisted sign-in session.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

use super::state::User;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Stored session is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Where the signed-in user survives restarts.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<User>, StorageError>;

    fn save(&self, user: &User) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

/// Session kept in a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<User>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, user: &User) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(user)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-process session, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    user: Mutex<Option<User>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<User>, StorageError> {
        Ok(self.user.lock().clone())
    }

    fn save(&self, user: &User) -> Result<(), StorageError> {
        *self.user.lock() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.user.lock() = None;
        Ok(())
    }
}
