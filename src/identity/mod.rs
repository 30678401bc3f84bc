//! Caller identity subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization header (opaque token)
//!     → client.rs (GET <identity>/v1/users/byToken/<token>/)
//!     → Identity::Resolved(data) | Identity::Anonymous
//!     → enricher.rs (body["user"] = identity)
//! ```

pub mod client;
pub mod enricher;

pub use client::{HttpIdentityProvider, IdentityError, IdentityProvider};
pub use enricher::{Identity, IdentityEnricher};
