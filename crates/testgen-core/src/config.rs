use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GenError, Result};

/// Name of the configuration file looked up from the working directory upwards.
pub const CONFIG_FILE: &str = "testgen.toml";

/// Top-level configuration from `testgen.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
}

/// Layout of the C/C++ project being scaffolded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    #[serde(default = "default_include_dir")]
    pub include_dir: String,
    /// Source file holding `main`, never linked into test binaries.
    #[serde(default)]
    pub entry_point: Option<String>,
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_include_dir() -> String {
    "include".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            include_dir: default_include_dir(),
            entry_point: None,
        }
    }
}

/// Knobs for what gets generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateConfig {
    #[serde(default = "default_header_extensions")]
    pub header_extensions: Vec<String>,
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    /// Project-relative globs of output files that are never written.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_header_extensions() -> Vec<String> {
    vec!["h".to_string(), "hpp".to_string()]
}

fn default_source_extensions() -> Vec<String> {
    vec!["c".to_string(), "cpp".to_string()]
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            header_extensions: default_header_extensions(),
            source_extensions: default_source_extensions(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a `testgen.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        toml::from_str(&content).map_err(|e| {
            GenError::Config(format!(
                "failed to parse '{}': {e}. Run `testgen init` to create a valid config file",
                path.display()
            ))
        })
    }

    /// Find `testgen.toml` in `dir` or its nearest ancestor.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        start
            .ancestors()
            .map(|d| d.join(CONFIG_FILE))
            .find(|p| p.is_file())
    }

    /// Load the nearest configuration and return it with its project root
    /// (the directory holding the file). Falls back to defaults rooted at
    /// `dir` when no file exists or the file is unreadable.
    pub fn load_or_default(dir: &Path) -> (Self, PathBuf) {
        let Some(config_path) = Self::find(dir) else {
            return (Self::default(), dir.to_path_buf());
        };
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dir.to_path_buf());
        match Self::load(&config_path) {
            Ok(config) => (config, root),
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "ignoring unreadable config, using defaults"
                );
                (Self::default(), root)
            }
        }
    }

    /// Default TOML content for `testgen init`.
    pub fn default_toml() -> String {
        r#"# testgen - test scaffolding configuration

[project]
# Directory holding the sources, relative to this file
source_dir = "src"
# Include directory inside source_dir
include_dir = "include"
# Source file holding main(); excluded from unit-test builds
# entry_point = "main.cpp"

[generate]
header_extensions = ["h", "hpp"]
source_extensions = ["c", "cpp"]
# Generated files matching these globs are never written
# exclude = ["tests/ut/CMakeLists.txt"]
exclude = []
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.project.source_dir, "src");
        assert_eq!(config.project.include_dir, "include");
        assert!(config.project.entry_point.is_none());
        assert_eq!(config.generate.header_extensions, vec!["h", "hpp"]);
        assert_eq!(config.generate.source_extensions, vec!["c", "cpp"]);
        assert!(config.generate.exclude.is_empty());
    }

    #[test]
    fn test_deserialize_config() {
        let toml_str = r#"
[project]
source_dir = "main"
entry_point = "app.cpp"

[generate]
header_extensions = ["hh"]
exclude = ["tests/mocks/**"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project.source_dir, "main");
        assert_eq!(config.project.include_dir, "include");
        assert_eq!(config.project.entry_point.as_deref(), Some("app.cpp"));
        assert_eq!(config.generate.header_extensions, vec!["hh"]);
        assert_eq!(config.generate.source_extensions, vec!["c", "cpp"]);
        assert_eq!(config.generate.exclude, vec!["tests/mocks/**"]);
    }

    #[test]
    fn test_default_toml_is_valid() {
        let config: Config = toml::from_str(&Config::default_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[project]\nsource_dir = \"main\"\n",
        )
        .unwrap();
        let nested = dir.path().join("main").join("drivers");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, root) = Config::load_or_default(&nested);
        assert_eq!(config.project.source_dir, "main");
        assert_eq!(root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let (config, root) = Config::load_or_default(dir.path());
        assert_eq!(config, Config::default());
        assert_eq!(root, dir.path());
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[project\nsource_dir = 1").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, GenError::Config(_)));
        assert!(err.is_user_error());
    }
}
