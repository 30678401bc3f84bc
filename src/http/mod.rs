//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, tracing, timeout)
//!     → handler.rs (dispatch pipeline)
//!     → routing / identity / proxy subsystems
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
