//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming path "/<service>/<rest>" (+ query)
//!     → resolver.rs (service key lookup in the route table)
//!     → host mapping from config
//!     → Target { http://<host>/<rest>?<query> } or TargetResolutionError
//! ```
//!
//! # Design Decisions
//! - Route table and host map are snapshotted at startup, immutable at runtime
//! - Deterministic: same path always resolves to the same target
//! - Unregistered services are client errors; registered services with no
//!   host are server misconfiguration

pub mod resolver;

pub use resolver::{Target, TargetResolutionError, TargetResolver};
