//! Driving port for the login form.
//!
//! Inbound adapters call it to turn credentials into a session identity
//! without knowing where accounts live, so handler tests can swap in a
//! double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, SignedInUser, UserId, UserRole};

/// Use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the identity to store in the session.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SignedInUser, Error>;
}

/// In-memory authenticator with a single demo account.
///
/// `admin` / `password` signs in as Ada with the `admin` role.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

const FIXTURE_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SignedInUser, Error> {
        if credentials.username() != "admin" || credentials.password() != "password" {
            return Err(Error::unauthorized("invalid credentials"));
        }
        let user_id = UserId::new(FIXTURE_USER_ID)
            .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))?;
        let role = UserRole::new("admin")
            .map_err(|err| Error::internal(format!("invalid fixture role: {err}")))?;
        Ok(SignedInUser {
            user_id,
            role: Some(role),
            first_name: Some("Ada".to_owned()),
        })
    }
}
