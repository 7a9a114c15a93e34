//! # Skyfit Domain
//!
//! Business domain types and models for Skyfit.
//!
//! This crate contains:
//! - Domain data types (Segment, Itinerary, ActivityWindow, PreviewTag)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Skyfit crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
