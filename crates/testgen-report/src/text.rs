use colored::Colorize;

use testgen_core::report::{GenerationReport, Outcome};

/// Format a generation report for terminal output, one line per artifact
/// followed by a summary.
pub fn format_report(report: &GenerationReport) -> String {
    let mut out = String::new();

    for artifact in &report.artifacts {
        let outcome = match artifact.outcome {
            Outcome::Written => artifact.outcome.to_string().green().bold(),
            Outcome::Appended => artifact.outcome.to_string().green(),
            Outcome::SkippedExists | Outcome::SkippedExcluded => {
                artifact.outcome.to_string().yellow()
            }
            Outcome::Unchanged => artifact.outcome.to_string().dimmed(),
        };
        match &artifact.detail {
            Some(detail) => out.push_str(&format!(
                "{outcome} {} ({detail})\n",
                artifact.path.display()
            )),
            None => out.push_str(&format!("{outcome} {}\n", artifact.path.display())),
        }
    }

    out.push_str(&format_summary(report));
    out
}

fn format_summary(report: &GenerationReport) -> String {
    if report.is_empty() {
        return format!("{}\n", "Nothing to generate.".dimmed());
    }

    let skipped = report.count(Outcome::SkippedExists) + report.count(Outcome::SkippedExcluded);
    let mut parts = vec![format!("{} written", report.count(Outcome::Written))];
    let appended = report.count(Outcome::Appended);
    if appended > 0 {
        parts.push(format!("{appended} appended"));
    }
    if skipped > 0 {
        parts.push(format!("{skipped} skipped"));
    }
    format!("\n{}: {}\n", "Summary".bold(), parts.join(", "))
}
