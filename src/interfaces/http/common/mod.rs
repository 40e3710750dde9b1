//! Shared HTTP plumbing: error bodies and request extractors

pub mod error;
pub mod validated_json;

pub use error::{error_response, ErrorBody};
pub use validated_json::ValidatedJson;
