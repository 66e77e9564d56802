//! Error types for core value conversions.

use thiserror::Error;

/// Errors raised when an engine wire value falls outside its enum range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// Line style outside 0..=5.
    #[error("line style {0} is out of range 0..=5")]
    LineStyle(i32),

    /// Arrow head outside 0..=6.
    #[error("arrow head {0} is out of range 0..=6")]
    ArrowHead(i32),

    /// Option value did not have the expected variant.
    #[error("option {key} expects a {expected} value")]
    OptionType { key: String, expected: &'static str },
}
