//! Request handler module
//!
//! Routing plus the solve endpoint itself.

pub mod router;
pub mod solve;

// Re-export main entry point
pub use router::handle_request;
