//! Page handlers.
//!
//! ```text
//! GET  /         home page
//! GET  /login    login form
//! POST /login    sign in, then redirect to /profile
//! POST /logout   purge the session, then redirect to /
//! GET  /profile  profile page (guarded)
//! POST /profile  first name and photo upload (guarded)
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ApiResult;
use super::auth_guard::LOGIN_PATH;
use super::redirect::{redirect_back, redirect_to};
use super::session::SessionContext;
use super::state::HttpState;
use super::upload::read_profile_form;
use super::view_context::PageContext;
use super::views::Views;
use crate::domain::{Error, ErrorCode, FlashKind, LoginCredentials, StoredFileName};

/// Where a successful login lands.
pub const PROFILE_PATH: &str = "/profile";

pub const MISSING_CREDENTIALS: &str = "Please enter a username and password";
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const PROFILE_UPDATED: &str = "Profile updated";

#[get("/")]
pub async fn home(views: web::Data<Views>, page: PageContext) -> ApiResult<HttpResponse> {
    views.page("index.html", &page)
}

#[get("/login")]
pub async fn login_form(views: web::Data<Views>, page: PageContext) -> ApiResult<HttpResponse> {
    views.page("login.html", &page)
}

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let Ok(credentials) = LoginCredentials::try_from_parts(&form.username, &form.password) else {
        session.flash(FlashKind::Error, MISSING_CREDENTIALS)?;
        return Ok(redirect_to(LOGIN_PATH));
    };

    match state.login.authenticate(&credentials).await {
        Ok(user) => {
            session.sign_in(&user)?;
            let greeting = match &user.first_name {
                Some(name) => format!("Welcome back, {name}"),
                None => "Welcome back".to_owned(),
            };
            session.flash(FlashKind::Success, greeting)?;
            info!(user_id = %user.user_id, "signed in");
            Ok(redirect_to(PROFILE_PATH))
        }
        Err(err) if err.code() == ErrorCode::Unauthorized => {
            warn!(username = credentials.username(), "login rejected");
            session.flash(FlashKind::Error, INVALID_CREDENTIALS)?;
            Ok(redirect_to(LOGIN_PATH))
        }
        Err(err) => Err(err),
    }
}

#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    redirect_to("/")
}

#[derive(Serialize)]
struct ProfilePage {
    #[serde(flatten)]
    page: PageContext,
    #[serde(rename = "profilePhoto", skip_serializing_if = "Option::is_none")]
    profile_photo: Option<String>,
}

/// `GET /profile`; mount behind [`super::auth_guard::RequireLogin`].
pub async fn profile(
    views: web::Data<Views>,
    session: SessionContext,
    page: PageContext,
) -> ApiResult<HttpResponse> {
    views.page(
        "profile.html",
        &ProfilePage {
            page,
            profile_photo: session.profile_photo(),
        },
    )
}

/// `POST /profile`; mount behind [`super::auth_guard::RequireLogin`].
///
/// Rejected uploads are reported through a flash message and a redirect
/// back, never as a failed request. Store failures are internal errors.
pub async fn update_profile(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;

    let form = match read_profile_form(payload, &state.upload_policy).await {
        Ok(form) => form,
        Err(rejection) => {
            warn!(user_id = %user_id, reason = %rejection, "upload rejected");
            session.flash(FlashKind::Error, rejection.flash_message())?;
            return Ok(redirect_back(&req));
        }
    };

    if let Some(first_name) = form
        .first_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        session.set_first_name(first_name)?;
    }

    if let Some(photo) = form.photo {
        let name = StoredFileName::for_photo(&user_id, state.clock.utc(), &photo);
        let stored = state
            .photos
            .store(name, photo)
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        session.remember_photo(&stored.file_name)?;
    }

    session.flash(FlashKind::Success, PROFILE_UPDATED)?;
    Ok(redirect_back(&req))
}
