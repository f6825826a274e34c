//! Domain ports and supporting types for the hexagonal boundary.

mod login_service;
mod photo_store;

pub use login_service::{FixtureLoginService, LoginService};
pub use photo_store::{PhotoStore, PhotoStoreError, StoredPhoto};
