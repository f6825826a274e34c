//! Read model of the session attributes the portal cares about.

use super::{UserId, UserRole};

/// What the current session says about its user.
///
/// Built by the inbound session adapter; every field is optional because a
/// fresh visitor has an empty session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user_id: Option<UserId>,
    pub authenticated: bool,
    pub role: Option<UserRole>,
    pub first_name: Option<String>,
}

impl SessionSnapshot {
    /// An empty, unauthenticated session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// True only when both a user id and the explicit authenticated flag are
    /// present.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::{SessionSnapshot, UserId};
    ///
    /// let mut session = SessionSnapshot::anonymous();
    /// session.user_id = Some(UserId::new("7").expect("valid id"));
    /// assert!(!session.is_authenticated());
    /// session.authenticated = true;
    /// assert!(session.is_authenticated());
    /// ```
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some() && self.authenticated
    }
}
