//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! (possibly enriched) request + Target
//!     → headers.rs (strip hop-by-hop, X-Forwarded-For)
//!     → forward.rs (rewrite URI/Host, send with timeout)
//!     → backend response
//!     → interceptor.rs (log, mask 500s)
//!     → caller
//! ```

pub mod forward;
pub mod headers;
pub mod interceptor;

pub use forward::{build_client, ForwardingProxy, HttpClient, ProxyError};
pub use interceptor::intercept;
