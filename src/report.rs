//! Human-readable rendering of diff, plan and execution results.
//!
//! Renderers return strings so the workflow decides where they go and tests
//! can assert on exact text.
use crate::executor::ExecutionReport;
use crate::reconcile::{DiffReport, RenamePlan};

pub fn render_diff(manifest_name: &str, report: &DiffReport) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        &format!(
            "{manifest_name} references {} distinct files.",
            report.referenced
        ),
    );
    push_line(&mut out, "");
    if report.is_clean() {
        push_line(&mut out, "All files match: nothing missing, nothing extra.");
        return out;
    }

    if report.missing.is_empty() {
        push_line(&mut out, "Every referenced file is present.");
    } else {
        push_line(
            &mut out,
            &format!(
                "{} missing (referenced in the manifest, not on disk):",
                report.missing.len()
            ),
        );
        push_list(&mut out, &report.missing);
    }
    push_line(&mut out, "");
    if report.extra.is_empty() {
        push_line(&mut out, "No unreferenced files.");
    } else {
        push_line(
            &mut out,
            &format!(
                "{} extra (on disk, not referenced in the manifest):",
                report.extra.len()
            ),
        );
        push_list(&mut out, &report.extra);
    }
    out
}

pub fn render_plan(manifest_name: &str, plan: &RenamePlan) -> String {
    let mut out = String::new();
    if plan.is_clean() {
        push_line(
            &mut out,
            &format!(
                "All {} checked files are correctly named.",
                plan.correct.len()
            ),
        );
        return out;
    }

    if !plan.renames.is_empty() {
        push_line(&mut out, &format!("{} renames planned:", plan.renames.len()));
        for entry in &plan.renames {
            push_line(&mut out, &format!("  '{}' -> '{}'", entry.from, entry.to));
        }
    }
    if !plan.correct.is_empty() {
        push_line(
            &mut out,
            &format!("{} files already correctly named.", plan.correct.len()),
        );
    }
    if !plan.unrenamable.is_empty() {
        push_line(
            &mut out,
            &format!(
                "{} left alone (channelId/userId in {manifest_name} are not plain digits):",
                plan.unrenamable.len()
            ),
        );
        push_list(&mut out, &plan.unrenamable);
    }
    if !plan.unmatched.is_empty() {
        push_line(
            &mut out,
            &format!(
                "{} unmatched (id not found in {manifest_name}):",
                plan.unmatched.len()
            ),
        );
        push_list(&mut out, &plan.unmatched);
    }
    if !plan.unrecognized.is_empty() {
        push_line(
            &mut out,
            &format!(
                "{} unrecognized names (ignored):",
                plan.unrecognized.len()
            ),
        );
        push_list(&mut out, &plan.unrecognized);
    }
    let conflicts = plan.conflicts();
    if !conflicts.is_empty() {
        push_line(
            &mut out,
            &format!(
                "warning: {} target names are already taken or shared; those renames will fail:",
                conflicts.len()
            ),
        );
        push_list(&mut out, &conflicts);
    }
    out
}

pub fn render_execution(report: &ExecutionReport) -> String {
    let mut out = String::new();
    for failure in &report.failures {
        push_line(
            &mut out,
            &format!(
                "failed: '{}' -> '{}': {}",
                failure.entry.from, failure.entry.to, failure.reason
            ),
        );
    }
    push_line(&mut out, &format!("renamed: {}", report.succeeded()));
    if report.failed() > 0 {
        push_line(&mut out, &format!("failed: {}", report.failed()));
    }
    out
}

fn push_list(out: &mut String, names: &[String]) {
    for name in names {
        push_line(out, &format!("  - {name}"));
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
