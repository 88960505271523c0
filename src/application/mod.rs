//! Application services (use cases).
//!
//! These services orchestrate domain logic and the solver port to implement
//! the allocation use case.

pub mod allocator;
pub mod builder;
pub mod interpreter;
pub mod solver;

pub use allocator::{solve, Allocator};
pub use builder::{build_model, CompiledModel};
