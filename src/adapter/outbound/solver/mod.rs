//! External solver backends implementing the `port::solver::Solver` trait.

#[cfg(feature = "highs")]
pub mod highs;

#[cfg(feature = "highs")]
pub use highs::HiGHSSolver;
