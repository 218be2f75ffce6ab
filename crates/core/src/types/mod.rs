//! Core types for Kubra Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod id;
pub mod patch;
pub mod status;

pub use amount::{Amount, AmountError};
pub use id::*;
pub use status::*;

/// Display name used when a shop reference cannot be resolved.
pub const UNKNOWN_SHOP: &str = "Unknown Shop";

/// Display name used when a shop category reference cannot be resolved.
pub const UNCATEGORIZED: &str = "Uncategorized";
