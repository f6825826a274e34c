//! Central error page.
//!
//! [`ErrorBoundary`] turns every failure raised below it into the rendered
//! `error.html` view. Responses carrying an attached error (handlers returning
//! `Err`) are replaced by the page. `Err` results from inner services stay
//! errors, wrapped in an [`InternalError`] whose response is the page.
//! Successful responses pass through untouched.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::http::header::{ContentType, HeaderValue, SET_COOKIE};
use actix_web::http::{Method, StatusCode};
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::error;

use super::view_context::current_locals;
use super::views::Views;
use crate::domain::ViewLocals;
use crate::middleware::TraceId;

/// Message shown to visitors when details are withheld.
pub const GENERIC_ERROR_MESSAGE: &str = "An error has occurred";

/// How much of a failure visitors get to see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorDisclosure {
    /// Production: always [`GENERIC_ERROR_MESSAGE`].
    Generic,
    /// Development: the failure's own description.
    Detailed,
}

impl ErrorDisclosure {
    fn message_for(self, detail: &str) -> String {
        match self {
            Self::Generic => GENERIC_ERROR_MESSAGE.to_owned(),
            Self::Detailed => detail.to_owned(),
        }
    }
}

/// Middleware factory rendering failures through the error view.
#[derive(Clone)]
pub struct ErrorBoundary {
    views: Arc<Views>,
    disclosure: ErrorDisclosure,
}

impl ErrorBoundary {
    pub fn new(views: Arc<Views>, disclosure: ErrorDisclosure) -> Self {
        Self { views, disclosure }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorBoundary
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorBoundaryMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorBoundaryMiddleware {
            service,
            views: Arc::clone(&self.views),
            disclosure: self.disclosure,
        }))
    }
}

/// Service produced by [`ErrorBoundary`].
pub struct ErrorBoundaryMiddleware<S> {
    service: S,
    views: Arc<Views>,
    disclosure: ErrorDisclosure,
}

impl<S, B> Service<ServiceRequest> for ErrorBoundaryMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Only owned data may outlive the call: routing needs the request
        // to be uniquely referenced.
        let target = FailedRequest {
            method: req.method().clone(),
            path: req.path().to_owned(),
        };
        let locals = current_locals(req.request());
        let fut = self.service.call(req);
        let views = Arc::clone(&self.views);
        let disclosure = self.disclosure;

        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    let Some(failure) = res.response().error().map(ToString::to_string) else {
                        return Ok(res.map_into_boxed_body());
                    };
                    let status = failure_status(res.status());
                    target.log(status, &failure);
                    let cookies: Vec<HeaderValue> =
                        res.headers().get_all(SET_COOKIE).cloned().collect();
                    let locals = current_locals(res.request());
                    let (http_req, _) = res.into_parts();
                    let mut rendered = render_failure(&views, disclosure, &locals, status, &failure);
                    for cookie in cookies {
                        rendered.headers_mut().append(SET_COOKIE, cookie);
                    }
                    Ok(ServiceResponse::new(http_req, rendered))
                }
                Err(err) => {
                    let failure = err.to_string();
                    let status = failure_status(err.as_response_error().status_code());
                    target.log(status, &failure);
                    let rendered = render_failure(&views, disclosure, &locals, status, &failure);
                    Err(InternalError::from_response(err, rendered).into())
                }
            }
        })
    }
}

/// What the log line needs to know about a failed request.
struct FailedRequest {
    method: Method,
    path: String,
}

impl FailedRequest {
    fn log(&self, status: StatusCode, detail: &str) {
        error!(
            status = status.as_u16(),
            error = %detail,
            trace_id = TraceId::current().map(|id| id.to_string()).unwrap_or_default(),
            method = %self.method,
            path = %self.path,
            "request failed"
        );
    }
}

/// Keep explicit error statuses; anything else becomes 500.
fn failure_status(status: StatusCode) -> StatusCode {
    if status.is_client_error() || status.is_server_error() {
        status
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn render_failure(
    views: &Views,
    disclosure: ErrorDisclosure,
    locals: &ViewLocals,
    status: StatusCode,
    detail: &str,
) -> HttpResponse {
    let message = disclosure.message_for(detail);
    match views.render_error(&message, locals) {
        Ok(html) => HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(html),
        Err(view_error) => {
            error!(error = %view_error, "error view failed to render");
            HttpResponse::build(status)
                .content_type(ContentType::plaintext())
                .body(message)
        }
    }
}
