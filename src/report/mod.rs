//! Post-generation reports: trait frequencies and marketplace metadata.

/// Per-specimen and master metadata documents.
pub mod metadata;
/// Trait-frequency summary.
pub mod summary;
