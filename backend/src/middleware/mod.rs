//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns that are not tied to the
//! portal's pages, currently request tracing.

pub mod trace;

pub use trace::{Trace, TraceId};
