//! HTTP inbound adapter: middleware, extractors, views and page handlers.
//!
//! Request pipeline, outermost first:
//! trace → session → [`error_boundary`] → [`view_context`] →
//! [`static_files::css_content_type`] → pages (with [`auth_guard`] on
//! protected scopes) → static files.

pub mod auth_guard;
pub mod error;
pub mod error_boundary;
pub mod pages;
pub mod redirect;
pub mod session;
pub mod state;
pub mod static_files;
#[cfg(test)]
pub mod test_utils;
pub mod upload;
pub mod view_context;
pub mod views;

pub use error::ApiResult;
