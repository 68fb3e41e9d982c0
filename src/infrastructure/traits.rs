//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::{Path, PathBuf};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;

    /// Files below `dir` (recursive) with the given extension, sorted by path.
    fn find_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    fn find_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(io::Error::from)?;
            // Use WalkDir entry method, not filesystem syscall
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .path()
                .extension()
                .map(|ext| ext == extension)
                .unwrap_or(false);
            if matches {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn given_nested_dir_when_find_files_then_returns_matching_sorted() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let fs = RealFileSystem;
        fs.create_dir_all(&dir.path().join("b")).unwrap();
        fs.write(&dir.path().join("b/z.json"), "{}").unwrap();
        fs.write(&dir.path().join("a.json"), "{}").unwrap();
        fs.write(&dir.path().join("notes.txt"), "x").unwrap();

        // Act
        let found = fs.find_files(dir.path(), "json").unwrap();

        // Assert
        assert_eq!(
            found,
            vec![dir.path().join("a.json"), dir.path().join("b/z.json")]
        );
    }

    #[test]
    fn given_missing_parent_when_ensure_parent_then_creates_it() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out/deep/file.json");

        RealFileSystem.ensure_parent(&target).unwrap();

        assert!(dir.path().join("out/deep").is_dir());
    }
}
