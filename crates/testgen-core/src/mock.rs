use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GenError, Result};
use crate::extractor::DeclarationExtractor;
use crate::path_map::map_to_tree;
use crate::project::{Project, MOCKS_DIR};
use crate::render::{RenderSink, Template, TemplateParams};
use crate::report::{GenerationReport, Outcome};

/// Generates the interface header, mock header and mock implementation for
/// a single header.
pub struct MockSynthesizer<'a> {
    project: &'a Project,
    extractor: &'a dyn DeclarationExtractor,
    sink: &'a dyn RenderSink,
}

impl<'a> MockSynthesizer<'a> {
    pub fn new(
        project: &'a Project,
        extractor: &'a dyn DeclarationExtractor,
        sink: &'a dyn RenderSink,
    ) -> Self {
        Self {
            project,
            extractor,
            sink,
        }
    }

    /// Returns true if any mock file was written.
    ///
    /// The mirrored interface header marks a header as already mocked, so it
    /// is written after the other two. When an exclude pattern suppresses the
    /// marker, existing mock files are kept instead.
    pub fn synthesize_mock(
        &self,
        header_path: &Path,
        report: &mut GenerationReport,
    ) -> Result<bool> {
        let rel = self.project.relative(header_path)?;
        if !self.project.is_header(&rel) {
            return Err(GenError::NotAHeader {
                path: rel,
                expected: self.project.header_extensions().to_vec(),
            });
        }

        let interface = map_to_tree(&rel, self.project.source_dir(), Path::new(MOCKS_DIR))?;
        if self.project.absolute(&interface).exists() {
            debug!(header = %rel.display(), "mock already generated");
            report.record(interface, Outcome::SkippedExists);
            return Ok(false);
        }

        let source = self.project.absolute(&rel);
        if !source.is_file() {
            return Err(GenError::NotFound(rel));
        }
        let header = self.extractor.extract(&source)?;
        let include = self.project.include_spelling(&rel);
        let params = TemplateParams::Header {
            header: &header,
            include: &include,
        };

        let artifacts: [(Template, PathBuf); 3] = [
            (
                Template::MockHeader,
                interface.with_file_name(format!("mock_{}", header.name)),
            ),
            (
                Template::MockSource,
                interface.with_file_name(format!("mock_{}.cpp", header.stem())),
            ),
            (Template::InterfaceHeader, interface.clone()),
        ];

        let marker_excluded = self.project.is_excluded(&interface);
        let mut wrote = false;
        for (template, dest) in artifacts {
            if self.project.is_excluded(&dest) {
                report.record(dest, Outcome::SkippedExcluded);
                continue;
            }
            if marker_excluded && self.project.absolute(&dest).exists() {
                debug!(path = %dest.display(), "keeping existing mock file");
                report.record(dest, Outcome::SkippedExists);
                continue;
            }
            self.sink
                .render_to(template, &self.project.absolute(&dest), &params)?;
            report.record(dest, Outcome::Written);
            wrote = true;
        }
        Ok(wrote)
    }
}
