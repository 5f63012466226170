//! HTTP protocol layer module
//!
//! Response builders and request input decoding, decoupled from the message
//! handling logic.

pub mod form;
pub mod response;

// Re-export commonly used items
pub use form::{encode_pair, read_body, BodyError, Params};
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_health_response, build_json_response, build_options_response,
    build_redirect_response,
};
