//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services receive already-decoded records; loading them is the
//! infrastructure layer's job.

mod hierarchy;
mod payroll;

pub use hierarchy::HierarchyService;
pub use payroll::{PayrollService, PayrollSummary};
