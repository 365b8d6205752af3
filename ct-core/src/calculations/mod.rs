//! Numeric engine for the corporation tax computation.
//!
//! Pure functions over a [`TaxComputationInput`](crate::models::TaxComputationInput);
//! nothing here knows about tags, contexts or rendering.

pub mod common;
pub mod computation;

pub use computation::{ComputationLine, ComputationResult, TaxComputation};
