//! Server construction and middleware wiring.

mod config;
mod session_key;

pub use config::{AppSettings, RunMode, ServerConfig, SessionSecret, SettingsError};
pub use session_key::{derive_key, key_fingerprint};

use std::path::PathBuf;
use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::body::MessageBody;
use actix_web::cookie::{Key, SameSite, time::Duration};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};

use crate::inbound::http::auth_guard::RequireLogin;
use crate::inbound::http::error_boundary::{ErrorBoundary, ErrorDisclosure};
use crate::inbound::http::pages::{
    PROFILE_PATH, home, login, login_form, logout, profile, update_profile,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::static_files::{css_content_type, public_files};
use crate::inbound::http::view_context::ViewContext;
use crate::inbound::http::views::Views;
use crate::middleware::Trace;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sid";

/// Largest urlencoded form body accepted, in bytes.
const FORM_LIMIT: usize = 16 * 1024;

/// Cookie-backed session middleware: private (encrypted) content, HttpOnly,
/// `SameSite=Lax`, 24 hour lifetime.
pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(Duration::hours(24)))
        .build()
}

/// Everything [`build_app`] needs; cheap to clone per worker.
#[derive(Clone)]
pub struct AppDependencies {
    pub http_state: web::Data<HttpState>,
    pub views: Arc<Views>,
    pub key: Key,
    pub cookie_secure: bool,
    pub disclosure: ErrorDisclosure,
    pub public_dir: PathBuf,
}

/// Assemble the application.
///
/// Middleware, outermost first: trace, session, error boundary, view
/// context, CSS content type. Static files are registered last so routes
/// win.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        views,
        key,
        cookie_secure,
        disclosure,
        public_dir,
    } = deps;

    let profile_routes = web::resource(PROFILE_PATH)
        .wrap(RequireLogin::default())
        .route(web::get().to(profile))
        .route(web::post().to(update_profile));

    App::new()
        .app_data(http_state)
        .app_data(web::Data::from(Arc::clone(&views)))
        .app_data(web::FormConfig::default().limit(FORM_LIMIT))
        .wrap(from_fn(css_content_type))
        .wrap(ViewContext)
        .wrap(ErrorBoundary::new(views, disclosure))
        .wrap(session_middleware(key, cookie_secure))
        .wrap(Trace)
        .service(home)
        .service(login_form)
        .service(login)
        .service(logout)
        .service(profile_routes)
        .service(public_files(&public_dir))
}

/// Bind the listener and start serving.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    http_state: HttpState,
    views: Arc<Views>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie_secure,
        disclosure,
        bind_addr,
        public_dir,
    } = config;
    let deps = AppDependencies {
        http_state: web::Data::new(http_state),
        views,
        key,
        cookie_secure,
        disclosure,
        public_dir,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    tracing::info!(%bind_addr, "listening");
    Ok(server)
}
