//! Server-side HTML rendering with Tera.
//!
//! Templates live under the configured views directory and are loaded once at
//! startup. Handlers render through [`Views::page`]; the error boundary uses
//! [`Views::render_error`].

use std::path::{Path, PathBuf};

use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::{Error, ViewLocals};

/// Template rendered by the error boundary.
pub const ERROR_TEMPLATE: &str = "error.html";

/// Failures while loading or rendering templates.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("failed to load templates from {dir}: {source}")]
    Load {
        dir: PathBuf,
        #[source]
        source: tera::Error,
    },
    #[error("failed to build template context: {0}")]
    Context(#[source] tera::Error),
    #[error("failed to render {template}: {source}")]
    Render {
        template: String,
        #[source]
        source: tera::Error,
    },
}

/// Compiled template set.
#[derive(Debug)]
pub struct Views {
    tera: Tera,
}

#[derive(Serialize)]
struct ErrorPage<'a> {
    #[serde(flatten)]
    locals: &'a ViewLocals,
    error: &'a str,
}

impl Views {
    /// Compile every `*.html` template under `dir`.
    pub fn load(dir: &Path) -> Result<Self, ViewError> {
        let pattern = dir.join("**").join("*.html");
        let tera = Tera::new(&pattern.to_string_lossy()).map_err(|source| ViewError::Load {
            dir: dir.to_path_buf(),
            source,
        })?;
        tracing::info!(
            dir = %dir.display(),
            templates = tera.get_template_names().count(),
            "templates loaded"
        );
        Ok(Self { tera })
    }

    pub fn from_tera(tera: Tera) -> Self {
        Self { tera }
    }

    /// Render `template` with the fields of `data` as top-level variables.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, ViewError> {
        let context = Context::from_serialize(data).map_err(ViewError::Context)?;
        self.tera
            .render(template, &context)
            .map_err(|source| ViewError::Render {
                template: template.to_owned(),
                source,
            })
    }

    /// Render a full page as a `200 OK` HTML response.
    pub fn page<T: Serialize>(&self, template: &str, data: &T) -> Result<HttpResponse, Error> {
        let html = self
            .render(template, data)
            .map_err(|err| Error::internal(err.to_string()))?;
        Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(html))
    }

    /// Render the error page with `message` exposed as `error`.
    pub fn render_error(&self, message: &str, locals: &ViewLocals) -> Result<String, ViewError> {
        self.render(
            ERROR_TEMPLATE,
            &ErrorPage {
                locals,
                error: message,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    fn views_from(templates: &[(&str, &str)]) -> Views {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())
            .expect("templates compile");
        Views::from_tera(tera)
    }

    #[rstest]
    fn render_exposes_serialised_fields() {
        let views = views_from(&[("hello.html", "Hi {{ firstName }}")]);
        let locals = ViewLocals {
            first_name: Some("Ada".into()),
            ..ViewLocals::default()
        };
        assert_eq!(views.render("hello.html", &locals).expect("render"), "Hi Ada");
    }

    #[rstest]
    fn html_templates_escape_values() {
        let views = views_from(&[(ERROR_TEMPLATE, "{{ error }}")]);
        let html = views
            .render_error("<script>", &ViewLocals::default())
            .expect("render");
        assert_eq!(html, "&lt;script&gt;");
    }

    #[rstest]
    fn missing_template_is_a_render_error() {
        let views = views_from(&[]);
        let err = views
            .render("absent.html", &ViewLocals::default())
            .expect_err("template is missing");
        assert!(matches!(err, ViewError::Render { ref template, .. } if template == "absent.html"));
    }

    #[rstest]
    fn load_compiles_nested_templates() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("partials")).expect("mkdir");
        fs::write(dir.path().join("partials/name.html"), "{{ userId }}").expect("write");
        fs::write(
            dir.path().join("page.html"),
            r#"[{% include "partials/name.html" %}]"#,
        )
        .expect("write");

        let views = Views::load(dir.path()).expect("load");
        let locals = ViewLocals {
            user_id: Some("u1".into()),
            ..ViewLocals::default()
        };
        assert_eq!(views.render("page.html", &locals).expect("render"), "[u1]");
    }

    #[rstest]
    fn load_reports_broken_templates() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("broken.html"), "{% if %}").expect("write");
        assert!(matches!(
            Views::load(dir.path()),
            Err(ViewError::Load { .. })
        ));
    }
}
