//! # Error Types
//!
//! This module defines the error types for the optimization engine.
//! The engine distinguishes caller programming errors (invalid handles,
//! mismatched chromosome shapes, operator slots that are required but
//! unset, out-of-range parameters) from ordinary algorithm outcomes.
//! The former are reported as hard errors through these types; the
//! latter — for example a gradient search whose step size underflows —
//! are not errors at all and are reported through the iteration count
//! returned to the caller.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use genpool::error::{GeneticError, Result};
//!
//! fn some_function() -> Result<()> {
//!     // Function implementation
//!     Ok(())
//! }
//!
//! fn caller() {
//!     match some_function() {
//!         Ok(_) => println!("Success!"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

use thiserror::Error;

use crate::population::EntityId;

/// Represents errors that can occur in the optimization engine.
///
/// This enum provides specific error variants for different failure
/// scenarios. All variants except `Io` and `Format` indicate caller
/// programming errors and are not meaningfully recoverable.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when an entity handle refers to a slot that is
    /// not live, including double-release of the same handle.
    #[error("Stale entity handle: {0}")]
    StaleHandle(EntityId),

    /// Error that occurs when chromosome data does not match the
    /// population's declared shape.
    #[error("Chromosome shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Error that occurs when an operation needs an operator slot that
    /// has not been set on the population.
    #[error("Required operator is unset: {0}")]
    OperatorUnset(&'static str),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when an operation is not supported by the
    /// active chromosome representation or operator variant.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Error that occurs when a fitness calculation produces an
    /// unusable value.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error that occurs when serialized population data is malformed.
    #[error("Format error: {0}")]
    Format(String),
}

/// A specialized Result type for optimization engine operations.
///
/// This type is a convenience wrapper around `std::result::Result` with
/// the error type fixed to `GeneticError`.
///
/// ## Examples
///
/// ```rust
/// use genpool::error::{GeneticError, Result};
///
/// fn may_fail() -> Result<i32> {
///     // Some operation that might fail
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, GeneticError>;
