//! Dimension catalog service
//!
//! Loads and saves persisted dimensions through the filesystem boundary.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Dimension, DimensionType, DomainError};
use crate::infrastructure::traits::FileSystem;

/// Extension of persisted dimension files.
pub const DIMENSION_EXTENSION: &str = "json";

/// Dimensions loaded from a directory, one per tag, ordered by file path.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<(PathBuf, Dimension)>,
    by_tag: HashMap<DimensionType, usize>,
}

impl Catalog {
    /// Build a catalog; each tag may appear only once.
    pub fn new(entries: Vec<(PathBuf, Dimension)>) -> ApplicationResult<Self> {
        let mut by_tag = HashMap::with_capacity(entries.len());
        for (pos, (path, dim)) in entries.iter().enumerate() {
            if by_tag.insert(dim.dimension_type(), pos).is_some() {
                debug!("duplicate tag {} in {}", dim.dimension_type(), path.display());
                return Err(DomainError::AmbiguousDimension(dim.dimension_type()).into());
            }
        }
        Ok(Self { entries, by_tag })
    }

    pub fn get(&self, tag: DimensionType) -> Option<&Dimension> {
        self.by_tag.get(&tag).map(|&pos| &self.entries[pos].1)
    }

    /// Like [`Catalog::get`], failing for tags the catalog lacks.
    pub fn require(&self, tag: DimensionType) -> ApplicationResult<&Dimension> {
        self.get(tag)
            .ok_or_else(|| ApplicationError::UnknownDimension(tag.to_string()))
    }

    pub fn path_of(&self, tag: DimensionType) -> Option<&Path> {
        self.by_tag
            .get(&tag)
            .map(|&pos| self.entries[pos].0.as_path())
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.entries.iter().map(|(_, dim)| dim)
    }

    pub fn entries(&self) -> &[(PathBuf, Dimension)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Service for reading and writing dimension files.
pub struct CatalogService {
    fs: Arc<dyn FileSystem>,
}

impl CatalogService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read and validate one dimension file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_file(&self, path: &Path) -> ApplicationResult<Dimension> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("file not found: {}", path.display()),
                source: Box::new(io::Error::new(
                    io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read dimension", path)?;
        let dim = Dimension::from_json_str(&content)?;
        debug!("load_file: {} items from {}", dim.len(), path.display());
        Ok(dim)
    }

    /// Write a dimension in its persisted form, creating parent directories.
    #[instrument(level = "debug", skip(self, dim), fields(dimension = %dim.dimension_type()))]
    pub fn save_file(&self, path: &Path, dim: &Dimension, pretty: bool) -> ApplicationResult<()> {
        let mut content = dim.to_json_string(pretty)?;
        content.push('\n');
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write dimension", path)
    }

    /// Load every `*.json` dimension below `dir`.
    ///
    /// Files are parsed in parallel; the first failure in path order is returned.
    #[instrument(level = "debug", skip(self))]
    pub fn load_dir(&self, dir: &Path) -> ApplicationResult<Catalog> {
        if !self.fs.is_dir(dir) {
            return Err(ApplicationError::OperationFailed {
                context: format!("not a directory: {}", dir.display()),
                source: Box::new(io::Error::new(
                    io::ErrorKind::NotFound,
                    "directory does not exist",
                )),
            });
        }
        let files = self
            .fs
            .find_files(dir, DIMENSION_EXTENSION)
            .with_path_context("scan directory", dir)?;
        debug!("load_dir: found {} candidate files", files.len());

        let results: Vec<ApplicationResult<(PathBuf, Dimension)>> = files
            .par_iter()
            .map(|path| self.load_file(path).map(|dim| (path.clone(), dim)))
            .collect();

        // Collect successes, propagate first error
        let mut entries = Vec::with_capacity(results.len());
        for result in results {
            entries.push(result?);
        }
        Catalog::new(entries)
    }
}
