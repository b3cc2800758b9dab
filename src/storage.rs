//! Local artifact store.
//!
//! Artifacts are immutable files in a flat directory. Writes land in a hidden
//! temporary file first and are renamed into place without clobbering, so a
//! reader never observes a half-written artifact.

use actix_web::web;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tempfile::NamedTempFile;
use thiserror::Error;

const MAX_NAME_LEN: usize = 255;

lazy_static! {
    static ref SAFE_NAME: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid artifact name '{0}'")]
    InvalidName(String),
    #[error("artifact '{0}' not found")]
    NotFound(String),
    #[error("artifact '{0}' already exists")]
    AlreadyExists(String),
    #[error("deadline exceeded before artifact '{0}' was committed")]
    DeadlineExceeded(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("storage task failed: {0}")]
    Blocking(String),
}

impl From<actix_web::error::BlockingError> for StorageError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        StorageError::Blocking(e.to_string())
    }
}

/// Check a name against the safe filename alphabet.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let ok = name.len() <= MAX_NAME_LEN
        && SAFE_NAME.is_match(name)
        && !name.contains("..")
        && sanitize_filename::sanitize(name) == name;

    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating the backing directory if it is missing.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::debug!("Artifact store ready at {}", root.display());
        Ok(Self { root })
    }

    pub fn path_of(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    pub async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.path_of(name)?;
        Ok(web::block(move || path.is_file()).await?)
    }

    pub async fn write(&self, name: &str, content: Vec<u8>) -> Result<(), StorageError> {
        self.commit(name, content, None).await
    }

    /// Like [`write`](Self::write), but gives up without leaving a trace if
    /// `deadline` passes before the artifact is renamed into place.
    pub async fn write_before(
        &self,
        name: &str,
        content: Vec<u8>,
        deadline: Instant,
    ) -> Result<(), StorageError> {
        self.commit(name, content, Some(deadline)).await
    }

    async fn commit(
        &self,
        name: &str,
        content: Vec<u8>,
        deadline: Option<Instant>,
    ) -> Result<(), StorageError> {
        let target = self.path_of(name)?;
        let dir = self.root.clone();
        let name_owned = name.to_string();
        let size = content.len();

        web::block(move || -> Result<(), StorageError> {
            fs::create_dir_all(&dir)?;
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&content)?;
            tmp.as_file().sync_all()?;

            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(StorageError::DeadlineExceeded(name_owned));
            }

            tmp.persist_noclobber(&target).map_err(|e| {
                if e.error.kind() == io::ErrorKind::AlreadyExists {
                    StorageError::AlreadyExists(name_owned.clone())
                } else {
                    StorageError::Io(e.error)
                }
            })?;
            Ok(())
        })
        .await??;

        log::debug!("Stored artifact {} ({} bytes)", name, size);
        Ok(())
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_of(name)?;
        let name_owned = name.to_string();

        web::block(move || match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name_owned))
            }
            Err(e) => Err(StorageError::Io(e)),
        })
        .await?
    }
}
