pub mod errors;

pub use errors::*;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
