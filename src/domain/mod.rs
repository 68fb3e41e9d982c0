//! Domain layer: dimensions, depth-aware queries, builder and combinator
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod codec;
pub mod combinator;
pub mod dimension;
pub mod entities;
pub mod error;
pub mod query;
pub mod stats;

pub use builder::{display_name, HierarchyBuilder};
pub use combinator::{multiply_at_depth, Combination, Combinator, SelectionSpec};
pub use dimension::{Dimension, DimensionParts};
pub use entities::*;
pub use error::{DomainError, DomainResult, Relation};
pub use stats::DimensionStats;
