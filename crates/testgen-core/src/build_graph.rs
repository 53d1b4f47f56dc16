use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GenError, Result};
use crate::project::Project;
use crate::render::{RenderSink, Template, TemplateParams};
use crate::report::{GenerationReport, Outcome};
use crate::templates::{BuildListParams, BUILD_LIST_PREAMBLE};

/// Name of the per-directory build list.
pub const BUILD_LIST: &str = "CMakeLists.txt";

/// Keeps the chain of test-directory build lists consistent.
///
/// All paths are project-relative. Ancestor files are only ever appended
/// to; declarations of deleted directories are never removed.
pub struct BuildGraph<'a> {
    project: &'a Project,
    sink: &'a dyn RenderSink,
}

impl<'a> BuildGraph<'a> {
    pub fn new(project: &'a Project, sink: &'a dyn RenderSink) -> Self {
        Self { project, sink }
    }

    /// Walk upward from `leaf_dir` to `test_root`, making sure each parent
    /// build list declares the child directory below it.
    pub fn register_subdirectory_chain(
        &self,
        leaf_dir: &Path,
        test_root: &Path,
        report: &mut GenerationReport,
    ) -> Result<()> {
        if !leaf_dir.starts_with(test_root) {
            return Err(GenError::OutsideTestTree {
                path: leaf_dir.to_path_buf(),
                root: test_root.to_path_buf(),
            });
        }

        let mut current = leaf_dir;
        while current != test_root {
            let (Some(parent), Some(child)) = (current.parent(), current.file_name()) else {
                break;
            };
            self.declare_subdirectory(parent, &child.to_string_lossy(), report)?;
            current = parent;
        }
        Ok(())
    }

    fn declare_subdirectory(
        &self,
        dir: &Path,
        child: &str,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let rel = dir.join(BUILD_LIST);
        if self.project.is_excluded(&rel) {
            report.record_with_detail(rel, Outcome::SkippedExcluded, child);
            return Ok(());
        }

        let path = self.project.absolute(&rel);
        let line = format!("add_subdirectory({child})");

        match fs::read_to_string(&path) {
            Ok(text) if text.contains(&line) => {
                debug!(file = %rel.display(), child, "subdirectory already declared");
                report.record_with_detail(rel, Outcome::Unchanged, child);
            }
            Ok(text) => {
                let mut file = OpenOptions::new()
                    .append(true)
                    .open(&path)
                    .map_err(|e| GenError::io(&path, e))?;
                let separator = if text.is_empty() || text.ends_with('\n') {
                    ""
                } else {
                    "\n"
                };
                writeln!(file, "{separator}{line}").map_err(|e| GenError::io(&path, e))?;
                debug!(file = %rel.display(), child, "declared subdirectory");
                report.record_with_detail(rel, Outcome::Appended, child);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let parent = self.project.absolute(dir);
                fs::create_dir_all(&parent).map_err(|e| GenError::io(&parent, e))?;
                fs::write(&path, format!("{BUILD_LIST_PREAMBLE}\n{line}\n"))
                    .map_err(|e| GenError::io(&path, e))?;
                debug!(file = %rel.display(), child, "created build list");
                report.record_with_detail(rel, Outcome::Written, child);
            }
            Err(e) => return Err(GenError::io(&path, e)),
        }
        Ok(())
    }

    /// Regenerate the build list of a leaf test directory from scratch,
    /// enumerating the compiled sources of `source_dir` (minus the entry
    /// point) and the compiled files of `leaf_dir` itself.
    pub fn write_leaf_build_list(
        &self,
        leaf_dir: &Path,
        source_dir: &Path,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let rel = leaf_dir.join(BUILD_LIST);
        if self.project.is_excluded(&rel) {
            report.record(rel, Outcome::SkippedExcluded);
            return Ok(());
        }

        let entry_point = self.project.entry_point();
        let sources = self
            .compiled_files(source_dir)?
            .into_iter()
            .filter(|name| Some(name.as_str()) != entry_point)
            .map(|name| source_dir.join(name))
            .collect();
        let unit_tests = self.compiled_files(leaf_dir)?;

        let source_root = PathBuf::from(self.project.source_dir());
        let mut include_dirs = vec![source_root.clone()];
        let include_root = source_root.join(self.project.include_dir());
        if self.project.absolute(&include_root).is_dir() {
            include_dirs.push(include_root);
        }

        let path = self.project.absolute(&rel);
        let subdirectories = match fs::read_to_string(&path) {
            Ok(text) => declared_subdirectories(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(GenError::io(&path, e)),
        };

        let params = BuildListParams {
            test_name: test_name(leaf_dir),
            unit_tests,
            sources,
            include_dirs,
            subdirectories,
        };
        self.sink
            .render_to(Template::TestBuildList, &path, &TemplateParams::BuildList(&params))?;
        report.record(rel, Outcome::Written);
        Ok(())
    }

    /// Sorted file names of compiled sources directly inside `dir`.
    fn compiled_files(&self, dir: &Path) -> Result<Vec<String>> {
        let abs = self.project.absolute(dir);
        let entries = match fs::read_dir(&abs) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GenError::io(&abs, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GenError::io(&abs, e))?;
            let path = entry.path();
            if path.is_file() && self.project.is_source(&path) {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Subdirectories declared by `add_subdirectory(...)` lines, in file order.
pub fn declared_subdirectories(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for line in text.lines() {
        let Some(rest) = line.trim().strip_prefix("add_subdirectory(") else {
            continue;
        };
        let Some(name) = rest.strip_suffix(')') else {
            continue;
        };
        let name = name.trim().to_string();
        if !name.is_empty() && !found.contains(&name) {
            found.push(name);
        }
    }
    found
}

/// CMake target name of a test directory: "tests/ut/fs2" -> "tests_ut_fs2"
pub fn test_name(dir: &Path) -> String {
    dir.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("_")
}
