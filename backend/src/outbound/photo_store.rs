//! Disk-backed [`PhotoStore`] adapter.
//!
//! Files are written through a `cap_std` directory handle so a file name can
//! never reach outside the upload directory. Writes run on Tokio's blocking
//! pool and are awaited by the caller.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::{info, warn};

use crate::domain::ports::{PhotoStore, PhotoStoreError, StoredPhoto};
use crate::domain::{IncomingPhoto, StoredFileName};

/// Stores photos as plain files under one directory.
#[derive(Debug, Clone)]
pub struct DiskPhotoStore {
    root: PathBuf,
}

impl DiskPhotoStore {
    /// Use `root` as the upload directory, creating it when missing.
    ///
    /// # Examples
    /// ```
    /// use portal::outbound::DiskPhotoStore;
    ///
    /// let dir = std::env::temp_dir().join("portal-photo-store-doc");
    /// let store = DiskPhotoStore::open(&dir)?;
    /// assert_eq!(store.root(), dir.as_path());
    /// # Ok::<(), portal::domain::ports::PhotoStoreError>(())
    /// ```
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PhotoStoreError> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority()).map_err(|err| {
            PhotoStoreError::io(format!("create {}: {err}", root.display()))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl PhotoStore for DiskPhotoStore {
    async fn store(
        &self,
        name: StoredFileName,
        photo: IncomingPhoto,
    ) -> Result<StoredPhoto, PhotoStoreError> {
        let root = self.root.clone();
        let size = photo.bytes.len();
        let stored = tokio::task::spawn_blocking(move || {
            write_new_file(&root, &name, &photo.bytes).map(|path| StoredPhoto {
                file_name: name,
                path,
            })
        })
        .await
        .map_err(|err| PhotoStoreError::io(format!("photo write task failed: {err}")))??;

        info!(file = %stored.file_name, bytes = size, "stored profile photo");
        Ok(stored)
    }
}

fn write_new_file(
    root: &Path,
    name: &StoredFileName,
    bytes: &[u8],
) -> Result<PathBuf, PhotoStoreError> {
    let dir = Dir::open_ambient_dir(root, ambient_authority())
        .map_err(|err| PhotoStoreError::io(format!("open {}: {err}", root.display())))?;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(name.as_str(), &options).map_err(|err| {
        if err.kind() == io::ErrorKind::AlreadyExists {
            PhotoStoreError::already_exists(name.as_str())
        } else {
            PhotoStoreError::io(format!("create {name}: {err}"))
        }
    })?;

    if let Err(err) = file.write_all(bytes).and_then(|()| file.sync_all()) {
        drop(file);
        if let Err(cleanup) = dir.remove_file(name.as_str()) {
            warn!(file = %name, error = %cleanup, "failed to remove partial photo");
        }
        return Err(PhotoStoreError::io(format!("write {name}: {err}")));
    }

    Ok(root.join(name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use crate::domain::UserId;

    #[fixture]
    fn upload_root() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn photo(bytes: &[u8]) -> IncomingPhoto {
        IncomingPhoto {
            original_name: "me.png".into(),
            extension: ".png".into(),
            bytes: bytes.to_vec(),
        }
    }

    fn name_for(photo: &IncomingPhoto) -> StoredFileName {
        let user = UserId::new("u1").expect("valid id");
        let at = Utc
            .timestamp_millis_opt(1_234)
            .single()
            .expect("valid timestamp");
        StoredFileName::for_photo(&user, at, photo)
    }

    #[rstest]
    #[tokio::test]
    async fn writes_bytes_under_the_given_name(upload_root: TempDir) {
        let store = DiskPhotoStore::open(upload_root.path()).expect("open store");
        let incoming = photo(b"\x89PNG fake");
        let stored = store
            .store(name_for(&incoming), incoming)
            .await
            .expect("store photo");

        assert_eq!(stored.file_name.as_str(), "u1-1234.png");
        assert_eq!(stored.path, upload_root.path().join("u1-1234.png"));
        let written = std::fs::read(&stored.path).expect("read back");
        assert_eq!(written, b"\x89PNG fake");
    }

    #[rstest]
    #[tokio::test]
    async fn never_overwrites_an_existing_file(upload_root: TempDir) {
        let store = DiskPhotoStore::open(upload_root.path()).expect("open store");
        let first = photo(b"first");
        let name = name_for(&first);
        store.store(name.clone(), first).await.expect("first write");

        let err = store
            .store(name, photo(b"second"))
            .await
            .expect_err("second write must fail");
        assert_eq!(err, PhotoStoreError::already_exists("u1-1234.png"));
        let kept = std::fs::read(upload_root.path().join("u1-1234.png")).expect("read back");
        assert_eq!(kept, b"first");
    }

    #[rstest]
    fn open_creates_missing_directories(upload_root: TempDir) {
        let nested = upload_root.path().join("public").join("uploads");
        DiskPhotoStore::open(&nested).expect("open store");
        assert!(nested.is_dir());
    }
}
