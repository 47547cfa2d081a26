//! Shared value types and the error taxonomy.

/// Focus points, canvas dimensions and frame rates.
pub mod core;
/// `SuperzoomError` and `SuperzoomResult`.
pub mod error;
