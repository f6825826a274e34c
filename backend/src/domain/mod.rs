//! Domain primitives for the profile portal.
//!
//! Purpose: keep session, view, flash, and upload rules free of any HTTP
//! framework so the inbound adapters only translate requests into these types.
//!
//! Public surface:
//! - Error / ErrorCode — transport agnostic failure payload.
//! - SessionSnapshot, UserId, UserRole — what a session says about its user.
//! - ViewLocals and `populate_view_context` — per-request template variables.
//! - FlashMessages and FlashKind — the one-shot message queue.
//! - UploadPolicy, ImageKind, UploadRejection — profile photo rules.
//! - ports — driven interfaces (login, photo storage).

pub mod error;
pub mod flash;
pub mod ports;
pub mod session;
pub mod upload;
pub mod user;
pub mod view;

pub use self::error::{Error, ErrorCode};
pub use self::flash::{FlashKind, FlashMessages};
pub use self::session::SessionSnapshot;
pub use self::upload::{
    ImageKind, IncomingPhoto, StoredFileName, UploadPolicy, UploadRejection,
    PROFILE_PHOTO_FIELD,
};
pub use self::user::{LoginCredentials, SignedInUser, UserId, UserIdError, UserRole};
pub use self::view::{populate_view_context, ViewLocals};
