//! Driven port persisting validated profile photos.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{IncomingPhoto, StoredFileName};

/// Failures raised by photo store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoStoreError {
    /// A file with the computed name already exists.
    #[error("photo {name} already exists")]
    AlreadyExists { name: String },
    /// The write failed part-way or the directory is unusable.
    #[error("photo store i/o failed: {message}")]
    Io { message: String },
}

impl PhotoStoreError {
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Where a photo ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub file_name: StoredFileName,
    pub path: PathBuf,
}

#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Write `photo` under `name`. Existing files are never overwritten.
    async fn store(
        &self,
        name: StoredFileName,
        photo: IncomingPhoto,
    ) -> Result<StoredPhoto, PhotoStoreError>;
}
