//! Scenario service: combinations across the catalog's dimensions

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::application::services::Catalog;
use crate::domain::{Combinator, DimensionType, SelectionSpec};
use crate::infrastructure::traits::FileSystem;

/// Serialized selection rule for one dimension of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub dimension: DimensionType,
    #[serde(default)]
    pub depth: Option<usize>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub filter_ids: Vec<String>,
}

impl SelectionRequest {
    pub fn new(dimension: DimensionType) -> Self {
        Self {
            dimension,
            depth: None,
            parent_id: None,
            filter_ids: Vec::new(),
        }
    }

    /// Bind the request to its dimension in `catalog`.
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> ApplicationResult<SelectionSpec<'a>> {
        let dim = catalog.require(self.dimension)?;
        Ok(SelectionSpec {
            dimension: dim,
            depth: self.depth,
            parent_id: self.parent_id.clone(),
            filter_ids: self.filter_ids.clone(),
        })
    }
}

/// Per-dimension selected counts and the size of the product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub selections: Vec<(DimensionType, usize)>,
    /// `None` when the product overflows
    pub total: Option<usize>,
}

/// Service for enumerating scenario combinations.
pub struct ScenarioService {
    fs: Arc<dyn FileSystem>,
}

impl ScenarioService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read a selection file: a JSON array of selection requests.
    pub fn load_selection(&self, path: &Path) -> ApplicationResult<Vec<SelectionRequest>> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read selection", path)?;
        serde_json::from_str(&content).map_err(|e| ApplicationError::OperationFailed {
            context: format!("parse selection {}", path.display()),
            source: Box::new(e),
        })
    }

    fn combinator<'a>(
        catalog: &'a Catalog,
        requests: &[SelectionRequest],
    ) -> ApplicationResult<Combinator<'a>> {
        let specs = requests
            .iter()
            .map(|r| r.resolve(catalog))
            .collect::<ApplicationResult<Vec<_>>>()?;
        let combinator = Combinator::new(&specs)?;
        Ok(combinator)
    }

    /// Count selections without enumerating combinations.
    #[instrument(level = "debug", skip(self, catalog, requests), fields(requests = requests.len()))]
    pub fn summarize(
        &self,
        catalog: &Catalog,
        requests: &[SelectionRequest],
    ) -> ApplicationResult<ScenarioSummary> {
        let combinator = Self::combinator(catalog, requests)?;
        let selections = combinator
            .tags()
            .iter()
            .copied()
            .zip(combinator.counts())
            .collect();
        let total = combinator.len();
        debug!("summarize: total={:?}", total);
        Ok(ScenarioSummary { selections, total })
    }

    /// Write combinations as JSON lines (`{tag: item}` per line), at most `limit`.
    ///
    /// Returns the number of lines written.
    #[instrument(level = "debug", skip(self, catalog, requests, out), fields(requests = requests.len()))]
    pub fn write_json_lines<W: Write>(
        &self,
        catalog: &Catalog,
        requests: &[SelectionRequest],
        limit: Option<usize>,
        out: &mut W,
    ) -> ApplicationResult<usize> {
        let combinator = Self::combinator(catalog, requests)?;
        let mut written = 0;
        for combination in combinator.iter().take(limit.unwrap_or(usize::MAX)) {
            serde_json::to_writer(&mut *out, &combination).map_err(|e| {
                ApplicationError::OperationFailed {
                    context: "write combination".into(),
                    source: Box::new(e),
                }
            })?;
            writeln!(out).map_err(|e| ApplicationError::OperationFailed {
                context: "write combination".into(),
                source: Box::new(e),
            })?;
            written += 1;
        }
        debug!("write_json_lines: {} combinations", written);
        Ok(written)
    }
}
