//! Core payment batch types, identifier checks, and batch validation.
//!
//! This module holds everything that does not touch XML: the immutable
//! value objects a caller hands in, the per-variant strategy table, and the
//! pre-flight validation that runs before any document is built.

pub mod amount;
mod builder;
mod clock;
pub mod countries;
pub mod currencies;
mod error;
pub mod identifiers;
pub mod text;
mod types;
mod validation;
mod variant;

pub use builder::*;
pub use clock::*;
pub use error::*;
pub use types::*;
pub use validation::*;
pub use variant::*;
