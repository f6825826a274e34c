//! Route guard that turns anonymous visitors away from protected pages.
//!
//! Wrap a scope or resource with [`RequireLogin`]; requests without an
//! authenticated session get `302 Found` to the login page and never reach
//! the handler.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::LOCATION;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use super::session::SessionContext;

/// Path anonymous visitors are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Middleware factory requiring an authenticated session.
///
/// # Examples
/// ```
/// use actix_web::{App, HttpResponse, web};
/// use portal::inbound::http::auth_guard::RequireLogin;
///
/// let _app = App::new().service(
///     web::resource("/profile")
///         .wrap(RequireLogin::default())
///         .route(web::get().to(|| async { HttpResponse::Ok().finish() })),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct RequireLogin {
    login_path: Rc<str>,
}

impl RequireLogin {
    pub fn redirecting_to(login_path: &str) -> Self {
        Self {
            login_path: Rc::from(login_path),
        }
    }
}

impl Default for RequireLogin {
    fn default() -> Self {
        Self::redirecting_to(LOGIN_PATH)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireLogin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireLoginMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireLoginMiddleware {
            service,
            login_path: Rc::clone(&self.login_path),
        }))
    }
}

/// Service produced by [`RequireLogin`].
pub struct RequireLoginMiddleware<S> {
    service: S,
    login_path: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for RequireLoginMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if SessionContext::of(&req).snapshot().is_authenticated() {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        debug!(path = %req.path(), "anonymous request redirected to login");
        let response = HttpResponse::Found()
            .insert_header((LOCATION, &*self.login_path))
            .finish()
            .map_into_right_body();
        let (http_req, _) = req.into_parts();
        Box::pin(ready(Ok(ServiceResponse::new(http_req, response))))
    }
}
