//! Focus-point share links.

/// Query-string and path link formats.
pub mod link;
