//! Rendering use case - turns a diff into the plain-text change report

use std::fmt::Write;

use crate::model::{ChangeAction, DiffRecord};

const HEADER: &str = "Changes found:\n";

/// Render a diff as a report grouped by action
///
/// ```text
/// Changes found:
///
/// Added jobs:
/// - Software Engineer:
///   https://careers.google.com/jobs/results/123
/// ```
///
/// Links are shown without their query string. Callers skip rendering for an
/// empty diff; an empty slice yields only the header.
pub fn format_report(diff: &[DiffRecord]) -> String {
    let mut report = String::from(HEADER);

    push_section(&mut report, "Added jobs:", diff, ChangeAction::Added);
    push_section(&mut report, "Removed jobs:", diff, ChangeAction::Removed);

    report
}

fn push_section(report: &mut String, title: &str, diff: &[DiffRecord], action: ChangeAction) {
    let mut records = diff.iter().filter(|r| r.action == action).peekable();
    if records.peek().is_none() {
        return;
    }

    report.push('\n');
    report.push_str(title);
    for record in records {
        // Writing to a String cannot fail
        let _ = write!(
            report,
            "\n- {}:\n  {}\n",
            record.entry.name,
            record.entry.display_link()
        );
    }
}
