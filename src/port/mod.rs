//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`Solver`] - LP/MILP optimization backend

pub mod solver;

pub use solver::{Solution, SolutionStatus, Solver, SolverOptions};
