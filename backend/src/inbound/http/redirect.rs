//! "Go back" redirects for form posts.

use actix_web::http::header::{LOCATION, REFERER};
use actix_web::{HttpRequest, HttpResponse};
use url::Url;

/// Where visitors land when there is no usable referrer.
pub const FALLBACK_LOCATION: &str = "/";

/// Path (with query) of the referring page when it belongs to this host.
///
/// Cross-origin or unparsable referrers fall back to `/` so the redirect can
/// never leave the site.
pub fn back_location(req: &HttpRequest) -> String {
    let Some(referer) = req.headers().get(REFERER).and_then(|v| v.to_str().ok()) else {
        return FALLBACK_LOCATION.to_owned();
    };
    let Ok(url) = Url::parse(referer) else {
        return FALLBACK_LOCATION.to_owned();
    };
    let host = req.connection_info().host().to_owned();
    let referer_host = match (url.host_str(), url.port()) {
        (Some(name), Some(port)) => format!("{name}:{port}"),
        (Some(name), None) => name.to_owned(),
        (None, _) => return FALLBACK_LOCATION.to_owned(),
    };
    if !referer_host.eq_ignore_ascii_case(&host) {
        return FALLBACK_LOCATION.to_owned();
    }
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}

/// `302 Found` back to the referring page.
pub fn redirect_back(req: &HttpRequest) -> HttpResponse {
    redirect_to(&back_location(req))
}

/// `302 Found` to `location`.
pub fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}
