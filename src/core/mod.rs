//! Format-independent building blocks.
//!
//! - [`range`]: inclusive intervals, unions, merges, distances and clustering
//! - [`stats`]: summary statistics and N50

pub mod range;
pub mod stats;
