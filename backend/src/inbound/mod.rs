//! Inbound adapters that translate browser requests into domain calls while
//! keeping framework details at the edge.
//!
//! Everything the portal serves goes through [`http`].

pub mod http;
