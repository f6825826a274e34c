//! Profile photo upload rules.
//!
//! The HTTP adapter streams the multipart body and asks this module whether a
//! file may be kept; the photo store only ever sees files that passed here.
//!
//! Validation checks the declared extension and MIME type only. Content is
//! not sniffed, so a renamed non-image with an image MIME type is accepted.

use std::path::Path;

use chrono::{DateTime, Utc};

use super::UserId;

/// Multipart field carrying the profile photo.
pub const PROFILE_PHOTO_FIELD: &str = "profilePhoto";

/// Largest accepted photo, in bytes (5 MiB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Why an upload was refused. None of these fail the request; the adapter
/// turns them into a flash message and a redirect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("Only images are allowed")]
    NotAnImage,
    #[error("File too large")]
    TooLarge { limit: usize },
    #[error("Unexpected field")]
    UnexpectedField { field: String },
    #[error("Too many files")]
    TooManyFiles,
    #[error("Malformed upload: {0}")]
    Malformed(String),
}

impl UploadRejection {
    /// Text queued as a flash error for the user.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::UploadRejection;
    ///
    /// assert_eq!(UploadRejection::NotAnImage.flash_message(), "Only images are allowed");
    /// assert_eq!(
    ///     UploadRejection::TooLarge { limit: 10 }.flash_message(),
    ///     "Error uploading file: File too large"
    /// );
    /// ```
    pub fn flash_message(&self) -> String {
        match self {
            Self::NotAnImage => self.to_string(),
            _ => format!("Error uploading file: {self}"),
        }
    }
}

/// Image formats accepted for profile photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// Match a bare token (`"jpg"`, `"png"`, ...) against the allow-list.
    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Classify a MIME type such as `image/png; charset=binary`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        let (top, sub) = essence.split_once('/')?;
        if !top.eq_ignore_ascii_case("image") {
            return None;
        }
        Self::from_token(sub)
    }
}

/// Final extension of a client-supplied file name, without the dot.
///
/// Browsers on some platforms send full paths, so both separators are
/// stripped before looking at the extension.
fn file_extension(file_name: &str) -> Option<&str> {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    Path::new(base).extension().and_then(|ext| ext.to_str())
}

/// Limits applied to the profile photo form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub field_name: String,
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            field_name: PROFILE_PHOTO_FIELD.to_owned(),
            max_bytes: MAX_PHOTO_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Check the declared name and MIME type of an incoming file.
    ///
    /// Both must be on the allow-list. Returns the original extension,
    /// including its leading dot and original casing.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::{UploadPolicy, UploadRejection};
    ///
    /// let policy = UploadPolicy::default();
    /// assert_eq!(policy.check_type("me.PNG", Some("image/png")), Ok(".PNG".to_owned()));
    /// assert_eq!(
    ///     policy.check_type("me.exe", Some("image/png")),
    ///     Err(UploadRejection::NotAnImage)
    /// );
    /// ```
    pub fn check_type(
        &self,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<String, UploadRejection> {
        let mime_ok = content_type.and_then(ImageKind::from_mime).is_some();
        let extension = file_extension(file_name)
            .filter(|ext| ImageKind::from_token(ext).is_some())
            .ok_or(UploadRejection::NotAnImage)?;
        if !mime_ok {
            return Err(UploadRejection::NotAnImage);
        }
        Ok(format!(".{extension}"))
    }

    /// Reject a running byte count once it passes the limit.
    pub fn check_size(&self, received: usize) -> Result<(), UploadRejection> {
        if received > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// A photo that passed validation and is waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingPhoto {
    pub original_name: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// On-disk name of a stored photo: `{userId}-{epochMillis}{extension}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFileName(String);

impl StoredFileName {
    /// Build the deterministic name for `photo` uploaded by `user_id` at `at`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use portal::domain::{IncomingPhoto, StoredFileName, UserId};
    ///
    /// let photo = IncomingPhoto {
    ///     original_name: "me.png".into(),
    ///     extension: ".png".into(),
    ///     bytes: vec![],
    /// };
    /// let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    /// let name = StoredFileName::for_photo(&UserId::new("7").unwrap(), at, &photo);
    /// assert_eq!(name.as_str(), "7-1700000000123.png");
    /// ```
    pub fn for_photo(user_id: &UserId, at: DateTime<Utc>, photo: &IncomingPhoto) -> Self {
        Self(format!(
            "{user_id}-{}{}",
            at.timestamp_millis(),
            photo.extension
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoredFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
