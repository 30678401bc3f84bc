//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build state → Bind listener → Serve
//!
//! Shutdown:
//!     signals.rs: SIGTERM/SIGINT
//!     → shutdown.rs: latch flips, server future completes
//!     → stop accepting, drain in-flight requests, exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
