//! Minimal API gateway library.
//!
//! Routes `/<service>/<rest>` to the backend configured for `<service>`,
//! injects the caller identity into JSON request bodies and masks backend
//! internal errors behind a correlation id.

pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
