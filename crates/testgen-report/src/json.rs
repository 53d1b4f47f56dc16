use serde::Serialize;

use testgen_core::report::GenerationReport;

/// Wrapper that adds run metadata to a generation report.
#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    pub command: &'a str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub written: usize,
    #[serde(flatten)]
    pub report: &'a GenerationReport,
}

/// Format a run as JSON.
pub fn format_report(
    command: &str,
    report: &GenerationReport,
    error: Option<&str>,
    compact: bool,
) -> serde_json::Result<String> {
    let output = RunOutput {
        command,
        success: error.is_none(),
        error,
        written: report.modified_count(),
        report,
    };
    if compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    }
}
