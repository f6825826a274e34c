//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::UploadPolicy;
use crate::domain::ports::{LoginService, PhotoStore};

/// Dependency bundle for page handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub photos: Arc<dyn PhotoStore>,
    /// Source of upload timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub upload_policy: UploadPolicy,
}

impl HttpState {
    /// Construct state with the default upload policy.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use portal::domain::ports::FixtureLoginService;
    /// use portal::inbound::http::state::HttpState;
    /// use portal::outbound::DiskPhotoStore;
    ///
    /// let photos = DiskPhotoStore::open(std::env::temp_dir().join("portal-state-doc"))?;
    /// let state = HttpState::new(
    ///     Arc::new(FixtureLoginService),
    ///     Arc::new(photos),
    ///     Arc::new(DefaultClock),
    /// );
    /// assert_eq!(state.upload_policy.max_bytes, 5 * 1024 * 1024);
    /// # Ok::<(), portal::domain::ports::PhotoStoreError>(())
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        photos: Arc<dyn PhotoStore>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            login,
            photos,
            clock,
            upload_policy: UploadPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.upload_policy = policy;
        self
    }
}
