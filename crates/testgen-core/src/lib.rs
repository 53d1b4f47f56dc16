pub mod build_graph;
pub mod config;
pub mod error;
pub mod extractor;
pub mod mock;
pub mod path_map;
pub mod project;
pub mod render;
pub mod report;
pub mod templates;
pub mod types;

pub use build_graph::BuildGraph;
pub use config::Config;
pub use error::{GenError, Result};
pub use extractor::DeclarationExtractor;
pub use mock::MockSynthesizer;
pub use project::Project;
pub use render::{RenderSink, Template, TemplateParams, TemplateRenderer};
pub use report::{ArtifactRecord, GenerationReport, Outcome};
pub use types::*;
pub use unit_test::UnitTestSynthesizer;
