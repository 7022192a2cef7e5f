//! HTTP protocol layer module
//!
//! Response builders and shared headers, kept apart from the solve logic.

pub mod response;

// Re-export commonly used types
pub use response::{
    apply_common_headers, build_404_response, build_405_response, build_413_response,
    build_error_response, build_health_response, build_options_response, json_response,
    SOLVE_ALLOW,
};
