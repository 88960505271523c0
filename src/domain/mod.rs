//! Solver-agnostic domain types.
//!
//! - [`channel`] - Request records: channels, global constraints
//! - [`constraint`] - Linear rows and variable bounds
//! - [`model`] - Compiled LP/MILP model
//! - [`allocation`] - Results returned to callers
//! - [`error`] - Request validation errors

pub mod allocation;
pub mod channel;
pub mod constraint;
pub mod error;
pub mod model;

pub use allocation::{AllocationResult, AllocationStatus, ChannelBreakdown, Infeasibility, SolveStats};
pub use channel::{AllocationRequest, ChannelSpec, GlobalConstraints};
pub use constraint::{Constraint, ConstraintSense, VariableBounds};
pub use error::ValidationError;
pub use model::{Model, ObjectiveSense};
