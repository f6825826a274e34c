//! Static assets from the public directory.

use std::path::Path;

use actix_files::Files;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{CONTENT_TYPE, HeaderValue};
use actix_web::middleware::Next;
use actix_web::{Error, web};

use crate::domain;

/// Force `Content-Type: text/css` on successful `.css` responses.
///
/// Mount with `actix_web::middleware::from_fn(css_content_type)`.
pub async fn css_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let is_css = req.path().ends_with(".css");
    let mut res = next.call(req).await?;
    if is_css && res.status().is_success() {
        res.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/css"));
    }
    Ok(res)
}

async fn missing_asset() -> Result<&'static str, domain::Error> {
    Err(domain::Error::not_found("page not found"))
}

/// File service rooted at `dir`, mounted on `/`. Unknown paths become a
/// `not_found` error so the error boundary renders them.
pub fn public_files(dir: &Path) -> Files {
    Files::new("/", dir)
        .prefer_utf8(true)
        .default_handler(web::to(missing_asset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{App, test};
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    #[rstest]
    #[actix_web::test]
    async fn css_is_served_as_text_css() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("css")).expect("mkdir");
        fs::write(dir.path().join("css/site.css"), "body{}").expect("write");
        fs::write(dir.path().join("robots.txt"), "User-agent: *").expect("write");

        let app = test::init_service(
            App::new()
                .wrap(from_fn(css_content_type))
                .service(public_files(dir.path())),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/css/site.css").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/css")
        );

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/robots.txt").to_request())
                .await;
        assert_ne!(
            res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/css")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_paths_are_not_found() {
        let dir = tempdir().expect("tempdir");
        let app = test::init_service(App::new().service(public_files(dir.path()))).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/nope.css").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
