//! Error types for tree mutation and frame updates.
//!
//! Hierarchy operations validate their inputs before mutating anything,
//! so a returned error always leaves the tree unchanged.

use thiserror::Error;

/// Errors produced by element tree operations and document updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UiError {
    /// A child index was outside the valid range.
    #[error("child index {index} is out of range for {len} children")]
    OutOfRange { index: usize, len: usize },

    /// The operation received an element in an incompatible state,
    /// e.g. removing a child from an element that is not its parent.
    #[error("invalid input for hierarchy operation")]
    InvalidInput,

    /// A single-child container was asked to hold a second child.
    #[error("container accepts only a single child")]
    MultipleChild,

    /// The measure/arrange alternation failed to converge.
    #[error("layout did not converge within {limit} iterations")]
    MaxLayoutIteration { limit: u32 },

    /// The document window cannot be given a parent.
    #[error("the document window cannot be reparented")]
    InvalidWindowParent,
}
