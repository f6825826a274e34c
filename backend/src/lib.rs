//! Profile portal: session login, a guarded profile page and profile photo
//! uploads, rendered server-side.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::Trace;
