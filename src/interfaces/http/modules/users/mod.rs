//! Users module: own profile and admin deletion

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
