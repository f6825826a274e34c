//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **photo_store**: profile photos written to a local directory.
//!
//! Adapters translate between domain types and the infrastructure; they hold
//! no business rules.

pub mod photo_store;

pub use photo_store::DiskPhotoStore;
