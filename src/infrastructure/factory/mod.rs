//! Factory modules for building infrastructure components.
//!
//! Provides factory functions that construct fully-configured components
//! from application configuration.
//!
//! # Submodules
//!
//! - [`solver`] - Optimization solver construction

pub mod solver;

pub use solver::{build_allocator, build_solver};
