//! Request handler module
//!
//! Responsible for request routing dispatch and the messages endpoint.

pub mod messages;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
