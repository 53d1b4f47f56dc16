use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// What happened to a single artifact during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// File was (re)written.
    Written,
    /// File already existed and was left untouched.
    SkippedExists,
    /// File matches an exclude glob and was not written.
    SkippedExcluded,
    /// A subdirectory declaration was appended to a build list.
    Appended,
    /// The build list already declared the subdirectory.
    Unchanged,
}

impl Outcome {
    /// True when the run touched the file on disk.
    pub fn modified(&self) -> bool {
        matches!(self, Outcome::Written | Outcome::Appended)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Written => write!(f, "wrote"),
            Outcome::SkippedExists => write!(f, "skipped: already exists"),
            Outcome::SkippedExcluded => write!(f, "skipped: excluded"),
            Outcome::Appended => write!(f, "appended"),
            Outcome::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// A single artifact line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    /// Project-relative path of the artifact.
    pub path: PathBuf,
    pub outcome: Outcome,
    /// Extra context, e.g. the subdirectory that was declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Ordered audit trail of everything a run wrote or skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub artifacts: Vec<ArtifactRecord>,
}

impl GenerationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: impl Into<PathBuf>, outcome: Outcome) {
        self.artifacts.push(ArtifactRecord {
            path: path.into(),
            outcome,
            detail: None,
        });
    }

    pub fn record_with_detail(
        &mut self,
        path: impl Into<PathBuf>,
        outcome: Outcome,
        detail: impl Into<String>,
    ) {
        self.artifacts.push(ArtifactRecord {
            path: path.into(),
            outcome,
            detail: Some(detail.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.outcome == outcome)
            .count()
    }

    pub fn modified_count(&self) -> usize {
        self.artifacts.iter().filter(|a| a.outcome.modified()).count()
    }

    /// Outcomes recorded for `path`, in order.
    pub fn outcomes_for(&self, path: &Path) -> Vec<Outcome> {
        self.artifacts
            .iter()
            .filter(|a| a.path == path)
            .map(|a| a.outcome)
            .collect()
    }
}
