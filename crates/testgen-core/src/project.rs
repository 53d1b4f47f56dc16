use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::Config;
use crate::error::{GenError, Result};

/// Fixed location of generated mocks, relative to the project root.
pub const MOCKS_DIR: &str = "tests/mocks";
/// Fixed location of generated unit tests, relative to the project root.
pub const UT_DIR: &str = "tests/ut";

/// A configuration resolved against a concrete project root.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: Config,
    exclude: GlobSet,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.generate.exclude {
            let glob = Glob::new(pattern).map_err(|e| {
                GenError::Config(format!("invalid exclude pattern '{pattern}': {e}"))
            })?;
            builder.add(glob);
        }
        let exclude = builder
            .build()
            .map_err(|e| GenError::Config(format!("invalid exclude patterns: {e}")))?;
        Ok(Self {
            root: root.into(),
            config,
            exclude,
        })
    }

    /// Name of the source directory, e.g. "src"
    pub fn source_dir(&self) -> &str {
        &self.config.project.source_dir
    }

    pub fn include_dir(&self) -> &str {
        &self.config.project.include_dir
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.config.project.entry_point.as_deref()
    }

    /// Absolute form of a project-relative path.
    pub fn absolute(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }

    /// Normalise a user-supplied path to a project-relative one. Absolute
    /// paths must live under the project root.
    pub fn relative(&self, path: &Path) -> Result<PathBuf> {
        let rel = if path.is_absolute() {
            let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
            let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            canonical
                .strip_prefix(&root)
                .or_else(|_| path.strip_prefix(&self.root))
                .map(Path::to_path_buf)
                .map_err(|_| GenError::OutsideSourceTree {
                    path: path.to_path_buf(),
                    source_dir: self.source_dir().to_string(),
                })?
        } else {
            path.to_path_buf()
        };
        Ok(rel
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect())
    }

    pub fn is_header(&self, path: &Path) -> bool {
        has_extension(path, &self.config.generate.header_extensions)
    }

    pub fn is_source(&self, path: &Path) -> bool {
        has_extension(path, &self.config.generate.source_extensions)
    }

    pub fn header_extensions(&self) -> &[String] {
        &self.config.generate.header_extensions
    }

    /// Whether a project-relative output path matches an exclude glob.
    pub fn is_excluded(&self, rel: &Path) -> bool {
        self.exclude.is_match(rel)
    }

    /// How a header should be spelled in an `#include` from generated code:
    /// relative to the source directory, with a leading include directory
    /// stripped since both are on the include path.
    pub fn include_spelling(&self, rel_header: &Path) -> String {
        let mut parts: Vec<String> = rel_header
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if let Some(pos) = parts.iter().position(|p| p == self.source_dir()) {
            parts.drain(..=pos);
        }
        if parts.len() > 1 && parts[0] == self.include_dir() {
            parts.remove(0);
        }
        parts.join("/")
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e == ext))
}
