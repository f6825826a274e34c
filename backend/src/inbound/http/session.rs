//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the actix session so handlers and middleware speak in domain terms:
//! a [`SessionSnapshot`] to read, sign-in/sign-out to mutate, and the flash
//! queue.

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::{
    Error, FlashKind, FlashMessages, SessionSnapshot, SignedInUser, StoredFileName, UserId,
    UserRole,
};

pub(crate) const USER_ID_KEY: &str = "userId";
pub(crate) const AUTHENTICATED_KEY: &str = "authenticated";
pub(crate) const USER_ROLE_KEY: &str = "userRole";
pub(crate) const FIRST_NAME_KEY: &str = "firstName";
pub(crate) const PROFILE_PHOTO_KEY: &str = "profilePhoto";
pub(crate) const FLASH_KEY: &str = "flash";

/// Newtype wrapper exposing the portal's session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Session attached to any request-like value (`HttpRequest`,
    /// `ServiceRequest`, ...).
    pub fn of(req: &impl SessionExt) -> Self {
        Self(req.get_session())
    }

    /// Read the identity attributes.
    ///
    /// Unreadable or tampered values are logged and treated as absent, so a
    /// broken session simply looks anonymous.
    pub fn snapshot(&self) -> SessionSnapshot {
        let user_id = self
            .read::<String>(USER_ID_KEY)
            .and_then(|raw| match UserId::new(raw) {
                Ok(id) => Some(id),
                Err(error) => {
                    warn!(%error, "invalid user id in session");
                    None
                }
            });
        let role = self
            .read::<String>(USER_ROLE_KEY)
            .and_then(|raw| UserRole::new(raw).ok());
        SessionSnapshot {
            user_id,
            authenticated: self.read::<bool>(AUTHENTICATED_KEY).unwrap_or(false),
            role,
            first_name: self.read::<String>(FIRST_NAME_KEY),
        }
    }

    /// Require a signed-in user or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        let snapshot = self.snapshot();
        if !snapshot.is_authenticated() {
            return Err(Error::unauthorized("login required"));
        }
        snapshot
            .user_id
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Store a freshly authenticated identity under a new session id.
    pub fn sign_in(&self, user: &SignedInUser) -> Result<(), Error> {
        self.0.renew();
        self.write(USER_ID_KEY, user.user_id.as_str())?;
        self.write(AUTHENTICATED_KEY, true)?;
        match &user.role {
            Some(role) => self.write(USER_ROLE_KEY, role.as_str())?,
            None => {
                self.0.remove(USER_ROLE_KEY);
            }
        }
        match &user.first_name {
            Some(name) => self.write(FIRST_NAME_KEY, name)?,
            None => {
                self.0.remove(FIRST_NAME_KEY);
            }
        }
        Ok(())
    }

    /// Destroy the session and its cookie.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    pub fn set_first_name(&self, first_name: &str) -> Result<(), Error> {
        self.write(FIRST_NAME_KEY, first_name)
    }

    /// Remember the latest stored profile photo for display.
    pub fn remember_photo(&self, file_name: &StoredFileName) -> Result<(), Error> {
        self.write(PROFILE_PHOTO_KEY, file_name.as_str())
    }

    pub fn profile_photo(&self) -> Option<String> {
        self.read(PROFILE_PHOTO_KEY)
    }

    /// Queue a message for the next rendered page.
    pub fn flash(&self, kind: FlashKind, message: impl Into<String>) -> Result<(), Error> {
        let mut pending = self.read::<FlashMessages>(FLASH_KEY).unwrap_or_default();
        pending.push(kind, message);
        self.write(FLASH_KEY, &pending)
    }

    /// Read and clear all queued messages.
    pub fn take_flash(&self) -> FlashMessages {
        let pending = self.read::<FlashMessages>(FLASH_KEY).unwrap_or_default();
        if self.0.remove(FLASH_KEY).is_some() {
            tracing::debug!(
                success = pending.success_message.len(),
                error = pending.error_message.len(),
                "drained flash messages"
            );
        }
        pending
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.0.get::<T>(key) {
            Ok(value) => value,
            Err(error) => {
                warn!(key, %error, "failed to read session value");
                None
            }
        }
    }

    fn write(&self, key: &str, value: impl Serialize) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self::of(req)))
    }
}
