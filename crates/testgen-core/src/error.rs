use std::path::PathBuf;

/// Errors raised by the generators.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("not a header file: '{}' (expected one of: {})", path.display(), expected.join(", "))]
    NotAHeader {
        path: PathBuf,
        expected: Vec<String>,
    },

    #[error("'{}' is outside the source directory '{source_dir}'", path.display())]
    OutsideSourceTree { path: PathBuf, source_dir: String },

    #[error("'{}' is not inside the test root '{}'", path.display(), root.display())]
    OutsideTestTree { path: PathBuf, root: PathBuf },

    #[error("no such file or directory: '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("template '{template}' cannot be rendered: {message}")]
    Template {
        template: &'static str,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for mistakes in what the user asked for, as opposed to
    /// environment failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            GenError::NotAHeader { .. }
                | GenError::OutsideSourceTree { .. }
                | GenError::OutsideTestTree { .. }
                | GenError::NotFound(_)
                | GenError::Config(_)
        )
    }
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
