//! Budget allocator - revenue-maximizing spend allocation across channels.
//!
//! Given advertising channels with a return on investment and optional spend
//! and revenue bounds, plus a total budget, the allocator finds the split
//! that maximizes total revenue `sum(spend_i * roi_i)`. An optional minimum
//! number of channels that must receive spend turns the linear program into
//! a mixed-integer program.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Request records, the compiled [`Model`](domain::Model) and results
//! - [`port`] - The [`Solver`](port::Solver) trait implemented by backends
//! - [`application`] - Model builder, native solver, result interpreter and
//!   the [`Allocator`](application::Allocator) service
//! - [`adapter`] - CLI (inbound) and the HiGHS backend (outbound, `highs` feature)
//! - [`infrastructure`] - Configuration, logging and solver factory
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `highs` - Enable the HiGHS backend through `good_lp`
//!
//! # Example
//!
//! ```
//! use budget_allocator::domain::{ChannelSpec, GlobalConstraints};
//!
//! let channels = [
//!     ChannelSpec::new("search", 5.0),
//!     ChannelSpec::new("display", 1.0),
//! ];
//! let constraints = GlobalConstraints::new(100.0).with_min_channels_used(2);
//!
//! let result = budget_allocator::solve(&channels, &constraints).unwrap();
//! assert!(result.is_optimal());
//! assert_eq!(result.channels_used, 2);
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

pub use application::allocator::{solve, Allocator};
pub use error::{Error, Result};
