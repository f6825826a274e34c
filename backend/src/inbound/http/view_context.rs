//! Per-request view locals.
//!
//! [`ViewContext`] reads the session once per request and stores the derived
//! [`ViewLocals`] in the request extensions. Handlers pick them up through the
//! [`PageContext`] extractor, which also drains pending flash messages.

use std::task::{Context, Poll};

use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde::Serialize;

use super::session::SessionContext;
use crate::domain::{FlashMessages, ViewLocals, populate_view_context};

/// Locals for `req`: the ones stored by [`ViewContext`], or freshly derived
/// from the session when the middleware did not run.
pub fn current_locals(req: &HttpRequest) -> ViewLocals {
    if let Some(locals) = req.extensions().get::<ViewLocals>() {
        return locals.clone();
    }
    populate_view_context(&SessionContext::of(req).snapshot())
}

/// Middleware storing [`ViewLocals`] for every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewContext;

impl<S, B> Transform<S, ServiceRequest> for ViewContext
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ViewContextMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ViewContextMiddleware { service }))
    }
}

/// Service produced by [`ViewContext`].
pub struct ViewContextMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ViewContextMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let locals = populate_view_context(&SessionContext::of(&req).snapshot());
        req.extensions_mut().insert(locals);
        Box::pin(self.service.call(req))
    }
}

/// Everything a page template receives by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageContext {
    #[serde(flatten)]
    pub locals: ViewLocals,
    #[serde(flatten)]
    pub flash: FlashMessages,
}

impl FromRequest for PageContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self {
            locals: current_locals(req),
            flash: SessionContext::of(req).take_flash(),
        }))
    }
}
