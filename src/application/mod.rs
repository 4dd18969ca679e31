//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic; it performs no I/O of its own.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
