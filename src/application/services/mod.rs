//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the FileSystem boundary trait
//! but are themselves concrete structs, not traits.

mod build;
mod catalog;
mod scenario;

pub use build::{BuildRequest, BuildService};
pub use catalog::{Catalog, CatalogService, DIMENSION_EXTENSION};
pub use scenario::{ScenarioService, ScenarioSummary, SelectionRequest};
