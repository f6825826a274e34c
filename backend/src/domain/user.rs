//! User identity types carried in the session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum accepted length of a user identifier.
pub const USER_ID_MAX: usize = 64;

/// Validation errors for user-facing identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdError {
    #[error("user id must not be empty")]
    Empty,
    #[error("user id must be at most {max} characters")]
    TooLong { max: usize },
    #[error("user id may only contain ASCII letters, digits, '-' or '_'")]
    InvalidCharacters,
    #[error("user role must not be empty")]
    EmptyRole,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Stable user identifier.
///
/// The identifier becomes part of stored upload file names, so it is limited
/// to characters that cannot escape the upload directory.
///
/// # Examples
/// ```
/// use portal::domain::UserId;
///
/// assert!(UserId::new("user-42").is_ok());
/// assert!(UserId::new("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl Into<String>) -> Result<Self, UserIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UserIdError::Empty);
        }
        if id.len() > USER_ID_MAX {
            return Err(UserIdError::TooLong { max: USER_ID_MAX });
        }
        if !id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(UserIdError::InvalidCharacters);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Free-form role label such as `admin` or `member`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserRole(String);

impl UserRole {
    /// Construct a role, rejecting blank labels.
    pub fn new(role: impl Into<String>) -> Result<Self, UserIdError> {
        let role = role.into();
        if role.trim().is_empty() {
            return Err(UserIdError::EmptyRole);
        }
        Ok(Self(role))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserRole {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<UserRole> for String {
    fn from(value: UserRole) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserRole {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Username/password pair submitted by the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: String,
}

impl LoginCredentials {
    /// Validate raw form values. The username is trimmed; the password is not.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, UserIdError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserIdError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(UserIdError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Identity written into the session after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    pub user_id: UserId,
    pub role: Option<UserRole>,
    pub first_name: Option<String>,
}
