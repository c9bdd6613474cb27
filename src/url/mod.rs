//! URL handling module for Site-Spider
//!
//! This module provides fragment normalization, seed validation and the
//! compiled restriction pattern that scopes a crawl.

mod normalize;
mod restriction;

// Re-export main functions
pub use normalize::{has_arguments, normalize, trim_after, validate_seed};
pub use restriction::{default_restriction, Restriction};
