//! Per-request template variables derived from the session.

use serde::Serialize;

use super::SessionSnapshot;

/// Variables every template can rely on.
///
/// Serialised with the names the templates use (`isAuthenticated`, `userId`,
/// `userRole`, `firstName`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewLocals {
    pub is_authenticated: bool,
    pub user_id: Option<String>,
    pub user_role: Option<String>,
    pub first_name: Option<String>,
}

/// Copy session attributes into view locals.
///
/// A session with a user id is shown as signed in together with its role and
/// first name. Anything else yields anonymous locals. The function is pure,
/// so calling it repeatedly on the same session gives the same result.
///
/// # Examples
/// ```
/// use portal::domain::{populate_view_context, SessionSnapshot};
///
/// let locals = populate_view_context(&SessionSnapshot::anonymous());
/// assert!(!locals.is_authenticated);
/// assert!(locals.user_id.is_none());
/// ```
pub fn populate_view_context(session: &SessionSnapshot) -> ViewLocals {
    match &session.user_id {
        Some(user_id) => ViewLocals {
            is_authenticated: true,
            user_id: Some(user_id.to_string()),
            user_role: session.role.as_ref().map(|role| role.as_str().to_owned()),
            first_name: session.first_name.clone(),
        },
        None => ViewLocals::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, UserRole};
    use rstest::{fixture, rstest};

    #[fixture]
    fn signed_in() -> SessionSnapshot {
        SessionSnapshot {
            user_id: Some(UserId::new("42").expect("valid id")),
            authenticated: true,
            role: Some(UserRole::new("admin").expect("valid role")),
            first_name: Some("Ada".to_owned()),
        }
    }

    #[rstest]
    fn copies_identity_for_signed_in_session(signed_in: SessionSnapshot) {
        let locals = populate_view_context(&signed_in);
        assert_eq!(
            locals,
            ViewLocals {
                is_authenticated: true,
                user_id: Some("42".to_owned()),
                user_role: Some("admin".to_owned()),
                first_name: Some("Ada".to_owned()),
            }
        );
    }

    #[rstest]
    fn anonymous_session_is_not_authenticated() {
        let locals = populate_view_context(&SessionSnapshot::anonymous());
        assert_eq!(locals, ViewLocals::default());
    }

    #[rstest]
    fn population_is_idempotent(signed_in: SessionSnapshot) {
        let first = populate_view_context(&signed_in);
        let second = populate_view_context(&signed_in);
        assert_eq!(first, second);
    }

    #[rstest]
    fn user_id_alone_marks_view_as_signed_in() {
        let session = SessionSnapshot {
            user_id: Some(UserId::new("9").expect("valid id")),
            ..SessionSnapshot::default()
        };
        let locals = populate_view_context(&session);
        assert!(locals.is_authenticated);
        assert!(locals.user_role.is_none());
    }

    #[rstest]
    fn serialises_template_names(signed_in: SessionSnapshot) {
        let value = serde_json::to_value(populate_view_context(&signed_in)).expect("serialise");
        assert_eq!(value["isAuthenticated"], true);
        assert_eq!(value["userId"], "42");
        assert_eq!(value["userRole"], "admin");
        assert_eq!(value["firstName"], "Ada");
    }
}
