use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{GenError, Result};
use crate::templates::{self, BuildListParams};
use crate::types::HeaderDescriptor;

/// Built-in templates, one per artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    InterfaceHeader,
    MockHeader,
    MockSource,
    UnitTest,
    TestBuildList,
}

impl Template {
    pub fn id(&self) -> &'static str {
        match self {
            Template::InterfaceHeader => "mock/class_interface.h",
            Template::MockHeader => "mock/mock_class.h",
            Template::MockSource => "mock/mock_class.cpp",
            Template::UnitTest => "ut/ut_header.cpp",
            Template::TestBuildList => "ut/CMakeLists.txt",
        }
    }
}

/// Parameter bag handed to a template.
#[derive(Debug, Clone, Copy)]
pub enum TemplateParams<'a> {
    Header {
        header: &'a HeaderDescriptor,
        /// Spelling used to include the original header from a test.
        include: &'a str,
    },
    BuildList(&'a BuildListParams),
}

/// Destination of rendered artifacts.
pub trait RenderSink {
    /// Render `template` with `params` and write the result to `dest`,
    /// creating parent directories as needed.
    fn render_to(
        &self,
        template: Template,
        dest: &Path,
        params: &TemplateParams<'_>,
    ) -> Result<()>;
}

/// Renders the built-in templates and writes them to disk.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, template: Template, params: &TemplateParams<'_>) -> Result<String> {
        match (template, params) {
            (Template::InterfaceHeader, TemplateParams::Header { header, .. }) => {
                Ok(templates::interface_header(header))
            }
            (Template::MockHeader, TemplateParams::Header { header, .. }) => {
                Ok(templates::mock_header(header))
            }
            (Template::MockSource, TemplateParams::Header { header, .. }) => {
                Ok(templates::mock_source(header))
            }
            (Template::UnitTest, TemplateParams::Header { header, include }) => {
                Ok(templates::unit_test(header, include))
            }
            (Template::TestBuildList, TemplateParams::BuildList(params)) => {
                Ok(templates::test_build_list(params))
            }
            (template, _) => Err(GenError::Template {
                template: template.id(),
                message: "parameters do not match the template".to_string(),
            }),
        }
    }
}

impl RenderSink for TemplateRenderer {
    fn render_to(
        &self,
        template: Template,
        dest: &Path,
        params: &TemplateParams<'_>,
    ) -> Result<()> {
        let text = self.render(template, params)?;
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
            }
        }
        fs::write(dest, text).map_err(|e| GenError::io(dest, e))?;
        info!(template = template.id(), dest = %dest.display(), "rendered");
        Ok(())
    }
}
