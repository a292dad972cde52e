//! Command runners: load inputs, call the core, print results.
use crate::cli::{CheckArgs, RenameArgs, TargetArgs};
use crate::executor::{self, ExecutionReport};
use crate::index::build_index;
use crate::inventory::{list_regular_files, Inventory};
use crate::manifest::{load_manifest, manifest_path, ManifestNode};
use crate::prompt::Confirm;
use crate::reconcile::{self, DiffReport, RenamePlan};
use crate::references::extract_references;
use crate::report;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Resolved inputs for one run.
struct RunContext {
    dir: PathBuf,
    manifest_path: PathBuf,
    manifest_name: String,
    excluded: BTreeSet<String>,
}

impl RunContext {
    fn new(target: &TargetArgs) -> Self {
        let manifest_path = manifest_path(&target.dir, &target.manifest);
        let manifest_name = manifest_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| target.manifest.display().to_string());
        // Only a manifest that lives in `dir` hides its own name there.
        let manifest_in_dir = manifest_path
            .parent()
            .is_some_and(|parent| same_directory(parent, &target.dir));
        let exe_name = current_exe_name();
        let excluded = excluded_names(
            manifest_in_dir.then_some(manifest_name.as_str()),
            exe_name.as_deref(),
            &target.ignore,
        );
        Self {
            dir: target.dir.clone(),
            manifest_path,
            manifest_name,
            excluded,
        }
    }

    fn load_manifest(&self) -> Result<ManifestNode> {
        load_manifest(&self.manifest_path)
    }

    fn snapshot(&self) -> Result<Inventory> {
        list_regular_files(&self.dir)
    }
}

/// Names never treated as extra or planned for rename.
pub fn excluded_names(
    manifest_name: Option<&str>,
    exe_name: Option<&str>,
    ignore: &[String],
) -> BTreeSet<String> {
    let mut excluded: BTreeSet<String> = manifest_name
        .into_iter()
        .chain(exe_name)
        .map(str::to_string)
        .collect();
    excluded.extend(ignore.iter().cloned());
    excluded
}

/// Compare resolved paths, falling back to the literal paths when either
/// cannot be resolved.
fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn current_exe_name() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    exe.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    manifest: &'a str,
    #[serde(flatten)]
    report: &'a DiffReport,
    non_utf8_skipped: usize,
}

pub fn run_check(args: CheckArgs) -> Result<()> {
    let ctx = RunContext::new(&args.target);
    let manifest = ctx.load_manifest()?;
    let start = Instant::now();
    let expected = extract_references(&manifest);
    tracing::debug!(
        references = expected.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "references extracted"
    );
    let inventory = ctx.snapshot()?;
    let diff = reconcile::diff(&expected, &inventory.files, &ctx.excluded);

    if args.target.json {
        let output = CheckOutput {
            manifest: &ctx.manifest_name,
            report: &diff,
            non_utf8_skipped: inventory.non_utf8,
        };
        print_json(&output)?;
    } else {
        print!("{}", report::render_diff(&ctx.manifest_name, &diff));
    }
    Ok(())
}

#[derive(Serialize)]
struct RenameOutput<'a> {
    manifest: &'a str,
    plan: &'a RenamePlan,
    conflicts: Vec<String>,
    skipped_manifest_entries: usize,
    duplicate_ids: Vec<u64>,
    non_utf8_skipped: usize,
    executed: Option<&'a ExecutionReport>,
}

/// What happened after the plan was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    NothingToDo,
    DryRun,
    Cancelled,
    Executed(ExecutionReport),
}

pub fn run_rename(args: RenameArgs, confirm: &mut dyn Confirm) -> Result<RenameOutcome> {
    let ctx = RunContext::new(&args.target);
    let manifest = ctx.load_manifest()?;
    let entries = manifest.as_sequence().ok_or_else(|| {
        anyhow!(
            "manifest {} must be a list of entries for renaming",
            ctx.manifest_path.display()
        )
    })?;
    let index = build_index(entries);
    if index.is_empty() {
        tracing::warn!("manifest has no usable id/channelId/userId entries");
    }
    for id in &index.duplicates {
        tracing::warn!(id, "duplicate manifest id; the last entry wins");
    }
    if index.skipped > 0 {
        tracing::info!(skipped = index.skipped, "manifest entries without id/channelId/userId");
    }

    let inventory = ctx.snapshot()?;
    let plan = reconcile::plan(&inventory.files, &index, &ctx.excluded);

    if args.target.json {
        // JSON mode never prompts; it executes only when --yes was given.
        let outcome = if plan.renames.is_empty() {
            RenameOutcome::NothingToDo
        } else if args.yes {
            RenameOutcome::Executed(apply_plan(&ctx.dir, &plan))
        } else {
            RenameOutcome::DryRun
        };
        let executed = match &outcome {
            RenameOutcome::Executed(report) => Some(report),
            _ => None,
        };
        let output = RenameOutput {
            manifest: &ctx.manifest_name,
            plan: &plan,
            conflicts: plan.conflicts(),
            skipped_manifest_entries: index.skipped,
            duplicate_ids: index.duplicates.iter().copied().collect(),
            non_utf8_skipped: inventory.non_utf8,
            executed,
        };
        print_json(&output)?;
        return Ok(outcome);
    }

    print!("{}", report::render_plan(&ctx.manifest_name, &plan));
    if plan.renames.is_empty() {
        println!("Nothing to rename.");
        return Ok(RenameOutcome::NothingToDo);
    }
    if args.dry_run {
        println!("Dry run: no files were renamed.");
        return Ok(RenameOutcome::DryRun);
    }

    let question = format!("Apply {} renames in {}?", plan.renames.len(), ctx.dir.display());
    if !confirm.confirm(&question)? {
        println!("Cancelled: no files were renamed.");
        return Ok(RenameOutcome::Cancelled);
    }

    let outcome = apply_plan(&ctx.dir, &plan);
    print!("{}", report::render_execution(&outcome));
    Ok(RenameOutcome::Executed(outcome))
}

fn apply_plan(dir: &Path, plan: &RenamePlan) -> ExecutionReport {
    let start = Instant::now();
    let report = executor::execute(dir, &plan.renames);
    tracing::info!(
        renamed = report.succeeded(),
        failed = report.failed(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "rename plan applied"
    );
    report
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Preapproved;
    use std::fs;

    fn target(dir: &Path) -> TargetArgs {
        TargetArgs {
            dir: dir.to_path_buf(),
            manifest: PathBuf::from("cave.json"),
            ignore: Vec::new(),
            json: false,
            verbose: false,
        }
    }

    fn rename_args(dir: &Path, dry_run: bool) -> RenameArgs {
        RenameArgs {
            target: target(dir),
            yes: false,
            dry_run,
        }
    }

    fn seed(dir: &Path, manifest: &str, files: &[&str]) {
        fs::write(dir.join("cave.json"), manifest).expect("write manifest");
        for name in files {
            fs::write(dir.join(name), name.as_bytes()).expect("seed file");
        }
    }

    const MANIFEST: &str = r#"[{"id": 1, "channelId": 100, "userId": 9}]"#;

    #[test]
    fn excluded_names_cover_manifest_exe_and_ignores() {
        let excluded =
            excluded_names(Some("cave.json"), Some("cavrec"), &["notes.txt".to_string()]);
        let expected: BTreeSet<String> = ["cave.json", "cavrec", "notes.txt"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(excluded, expected);
    }

    #[test]
    fn manifest_name_is_excluded_only_when_it_lives_in_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let elsewhere = tempfile::tempdir().expect("create temp dir");
        fs::create_dir(dir.path().join("nested")).expect("create nested dir");

        let local = RunContext::new(&target(dir.path()));
        assert!(local.excluded.contains("cave.json"));

        let mut args = target(dir.path());
        args.manifest = elsewhere.path().join("cave.json");
        let outside = RunContext::new(&args);
        assert_eq!(outside.manifest_name, "cave.json");
        assert!(!outside.excluded.contains("cave.json"));

        args.manifest = PathBuf::from("nested/cave.json");
        assert!(!RunContext::new(&args).excluded.contains("cave.json"));

        args.manifest = dir.path().join("cave.json");
        assert!(RunContext::new(&args).excluded.contains("cave.json"));
    }

    #[test]
    fn outside_manifest_leaves_same_named_file_in_diff() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let elsewhere = tempfile::tempdir().expect("create temp dir");
        fs::write(elsewhere.path().join("cave.json"), r#"[{"file": "a.png"}]"#)
            .expect("write manifest");
        fs::write(dir.path().join("cave.json"), "{}").expect("write local file");
        fs::write(dir.path().join("a.png"), b"a").expect("seed file");

        let mut args = target(dir.path());
        args.manifest = elsewhere.path().join("cave.json");
        let ctx = RunContext::new(&args);
        let expected = extract_references(&ctx.load_manifest().expect("load manifest"));
        let inventory = ctx.snapshot().expect("list dir");
        let report = reconcile::diff(&expected, &inventory.files, &ctx.excluded);

        assert!(report.missing.is_empty());
        assert_eq!(report.extra, vec!["cave.json"]);
    }

    #[test]
    fn unusable_manifest_ids_leave_files_in_place() {
        let dir = tempfile::tempdir().expect("create temp dir");
        seed(
            dir.path(),
            r#"[{"id": 1, "channelId": "sub/x", "userId": 9},
                {"id": 2, "channelId": "abc", "userId": 9}]"#,
            &["1-0_100-9_ts.png", "2-0_100-9_ts.png"],
        );
        fs::create_dir(dir.path().join("1-0_sub")).expect("create subdir");

        let outcome =
            run_rename(rename_args(dir.path(), false), &mut Preapproved(true)).expect("run");

        assert_eq!(outcome, RenameOutcome::NothingToDo);
        assert!(dir.path().join("1-0_100-9_ts.png").exists());
        assert!(dir.path().join("2-0_100-9_ts.png").exists());
        assert!(!dir.path().join("1-0_sub/x-9_ts.png").exists());
    }

    #[test]
    fn declined_confirmation_changes_nothing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        seed(dir.path(), MANIFEST, &["1-0_200-9_ts.png"]);

        let outcome =
            run_rename(rename_args(dir.path(), false), &mut Preapproved(false)).expect("run");

        assert_eq!(outcome, RenameOutcome::Cancelled);
        assert!(dir.path().join("1-0_200-9_ts.png").exists());
    }

    #[test]
    fn dry_run_never_asks() {
        struct Panicking;
        impl Confirm for Panicking {
            fn confirm(&mut self, _question: &str) -> Result<bool> {
                panic!("dry run must not prompt");
            }
        }
        let dir = tempfile::tempdir().expect("create temp dir");
        seed(dir.path(), MANIFEST, &["1-0_200-9_ts.png"]);

        let outcome = run_rename(rename_args(dir.path(), true), &mut Panicking).expect("run");
        assert_eq!(outcome, RenameOutcome::DryRun);
    }

    #[test]
    fn second_run_after_apply_has_nothing_to_do() {
        let dir = tempfile::tempdir().expect("create temp dir");
        seed(
            dir.path(),
            MANIFEST,
            &["1-0_200-9_ts.png", "1_1_100_8_b.jpg", "notavalidname.png"],
        );

        let first =
            run_rename(rename_args(dir.path(), false), &mut Preapproved(true)).expect("run");
        let RenameOutcome::Executed(report) = first else {
            panic!("expected execution, got {first:?}");
        };
        assert_eq!(report.succeeded(), 2);
        assert!(dir.path().join("1-0_100-9_ts.png").exists());
        assert!(dir.path().join("1-1_100-9_b.jpg").exists());

        let second =
            run_rename(rename_args(dir.path(), false), &mut Preapproved(true)).expect("run");
        assert_eq!(second, RenameOutcome::NothingToDo);
    }

    #[test]
    fn collision_with_existing_target_leaves_both_files() {
        let dir = tempfile::tempdir().expect("create temp dir");
        seed(dir.path(), MANIFEST, &["1-0_100-9_ts.png", "1-0_200-9_ts.png"]);

        let outcome =
            run_rename(rename_args(dir.path(), false), &mut Preapproved(true)).expect("run");
        let RenameOutcome::Executed(report) = outcome else {
            panic!("expected execution");
        };
        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failed(), 1);
        let kept = fs::read(dir.path().join("1-0_100-9_ts.png")).expect("target intact");
        assert_eq!(kept, b"1-0_100-9_ts.png");
        assert!(dir.path().join("1-0_200-9_ts.png").exists());
    }

    #[test]
    fn non_list_manifest_is_rejected_for_rename() {
        let dir = tempfile::tempdir().expect("create temp dir");
        seed(dir.path(), r#"{"id": 1}"#, &[]);
        let err = run_rename(rename_args(dir.path(), false), &mut Preapproved(true))
            .expect_err("object manifest");
        assert!(err.to_string().contains("must be a list"));
    }
}
