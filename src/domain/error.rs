//! Validation errors for allocation requests.
//!
//! This module defines errors raised when an allocation request violates
//! an input invariant. They are returned by the model builder before any
//! solver runs, so a request that fails here was never optimized.
//!
//! # Examples
//!
//! ```
//! use budget_allocator::domain::channel::{ChannelSpec, GlobalConstraints};
//! use budget_allocator::domain::error::ValidationError;
//! use budget_allocator::application::builder::build_model;
//!
//! let channels = vec![ChannelSpec::new("search", -1.0)];
//! let result = build_model(&channels, &GlobalConstraints::new(100.0));
//!
//! assert!(matches!(result, Err(ValidationError::NegativeRoi { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when an allocation request is malformed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// At least one channel is required.
    #[error("channel list cannot be empty")]
    NoChannels,

    /// Channel identifiers must be non-empty.
    #[error("channel at position {index} has an empty id")]
    EmptyId {
        /// Zero-based position in the request.
        index: usize,
    },

    /// Channel identifiers must be unique within a request.
    #[error("duplicate channel id '{id}'")]
    DuplicateId {
        /// The repeated identifier.
        id: String,
    },

    /// Every numeric field must be a finite number.
    #[error("{field} for channel '{channel}' must be finite, got {value}")]
    NonFinite {
        /// Channel the value belongs to.
        channel: String,
        /// Field name as it appears in requests.
        field: &'static str,
        /// The offending value.
        value: f64,
    },

    /// ROI must be non-negative.
    #[error("roi for channel '{channel}' must be non-negative, got {roi}")]
    NegativeRoi {
        /// Channel identifier.
        channel: String,
        /// The invalid ROI.
        roi: f64,
    },

    /// Optional bounds must be non-negative when present.
    #[error("{field} for channel '{channel}' must be non-negative, got {value}")]
    NegativeBound {
        /// Channel identifier.
        channel: String,
        /// Field name as it appears in requests.
        field: &'static str,
        /// The offending value.
        value: f64,
    },

    /// `minSpend` must not exceed `maxSpend`.
    #[error("minSpend {min} exceeds maxSpend {max} for channel '{channel}'")]
    InvertedSpendBounds {
        /// Channel identifier.
        channel: String,
        /// Lower spend bound.
        min: f64,
        /// Upper spend bound.
        max: f64,
    },

    /// `minRevenue` must not exceed `maxRevenue`.
    #[error("minRevenue {min} exceeds maxRevenue {max} for channel '{channel}'")]
    InvertedRevenueBounds {
        /// Channel identifier.
        channel: String,
        /// Lower revenue bound.
        min: f64,
        /// Upper revenue bound.
        max: f64,
    },

    /// Total budget must be a finite, non-negative number.
    #[error("totalBudget must be a finite non-negative number, got {budget}")]
    InvalidBudget {
        /// The rejected budget.
        budget: f64,
    },

    /// `minChannelsUsed` must be a positive count.
    #[error("minChannelsUsed must be positive when present")]
    ZeroChannelsUsed,

    /// `minChannelsUsed` cannot exceed the number of channels.
    #[error("minChannelsUsed {required} exceeds the {available} channels provided")]
    TooManyChannelsRequired {
        /// Requested minimum number of used channels.
        required: usize,
        /// Number of channels in the request.
        available: usize,
    },
}
