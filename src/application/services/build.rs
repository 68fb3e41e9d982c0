//! Dimension build service
//!
//! Turns a nested source description into a validated dimension.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    Dimension, DimensionParts, DimensionType, HierarchyBuilder, HierarchyInfo, Metadata,
    ReferenceInfo,
};
use crate::infrastructure::traits::FileSystem;

/// Everything needed to build one dimension from nested source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub dimension: DimensionType,
    pub description: String,
    /// Human description of the level chain, e.g. `Chapter -> Condition`
    pub structure: String,
    pub levels: Vec<String>,
    /// Overrides the `levels.len() - 1` default
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub reference: Option<ReferenceInfo>,
    #[serde(default)]
    pub dimension_metadata: Metadata,
    /// Nested mapping/list tree of item keys
    pub source: Value,
}

impl BuildRequest {
    fn hierarchy(&self) -> HierarchyInfo {
        let mut hierarchy = HierarchyInfo::from_levels(self.structure.clone(), self.levels.clone());
        if let Some(max_depth) = self.max_depth {
            hierarchy.max_depth = max_depth;
        }
        hierarchy
    }
}

/// Service for building dimensions from source descriptions.
pub struct BuildService {
    fs: Arc<dyn FileSystem>,
}

impl BuildService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Run the hierarchy builder and validate the result.
    #[instrument(level = "debug", skip(self, request), fields(dimension = %request.dimension))]
    pub fn build(&self, request: &BuildRequest) -> ApplicationResult<Dimension> {
        let items = HierarchyBuilder::new(request.levels.iter().cloned()).build(&request.source);
        debug!("build: {} items from source", items.len());

        let dim = Dimension::new(DimensionParts {
            dimension: request.dimension,
            description: request.description.clone(),
            reference: request.reference.clone(),
            hierarchy: request.hierarchy(),
            items,
            dimension_metadata: request.dimension_metadata.clone(),
        })?;
        info!("built dimension {} with {} items", dim.dimension_type(), dim.len());
        Ok(dim)
    }

    /// Read a build request file.
    pub fn load_request(&self, path: &Path) -> ApplicationResult<BuildRequest> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read build request", path)?;
        serde_json::from_str(&content).map_err(|e| ApplicationError::OperationFailed {
            context: format!("parse build request {}", path.display()),
            source: Box::new(e),
        })
    }

    /// Read a build request file and build it.
    pub fn build_file(&self, path: &Path) -> ApplicationResult<Dimension> {
        let request = self.load_request(path)?;
        self.build(&request)
    }
}
