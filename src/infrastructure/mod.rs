//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits, decodes records and wires up services.

pub mod di;
pub mod error;
pub mod records;
pub mod traits;

pub use error::{InfraError, InfraResult};
