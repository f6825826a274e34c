//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use tera::Tera;

use super::views::Views;

/// Cookie name used by [`test_session_middleware`].
pub const TEST_SESSION_COOKIE: &str = "sid";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Disables the `Secure` flag for local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(TEST_SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == TEST_SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("response sets the session cookie")
}

/// Minimal templates mirroring the variables the real views use.
pub fn test_views() -> Views {
    let mut tera = Tera::default();
    tera.add_raw_templates([
        ("error.html", "<p>{{ error }}</p>"),
        (
            "index.html",
            "home:{{ isAuthenticated }}:{% for m in successMessage %}{{ m }};{% endfor %}",
        ),
        (
            "login.html",
            "login:{% for m in errorMessage %}{{ m }};{% endfor %}",
        ),
        (
            "profile.html",
            concat!(
                "profile:{{ userId }}:{{ firstName | default(value=\"\") }}:",
                "{{ profilePhoto | default(value=\"\") }}:",
                "{% for m in successMessage %}{{ m }};{% endfor %}",
                "{% for m in errorMessage %}{{ m }};{% endfor %}",
            ),
        ),
    ])
    .expect("test templates compile");
    Views::from_tera(tera)
}

/// Clock pinned to one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at_millis(millis: i64) -> Self {
        Self(
            Utc.timestamp_millis_opt(millis)
                .single()
                .expect("valid fixture timestamp"),
        )
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
