//! Per-header job orchestration: parse both revisions, diff, describe,
//! emit reports.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use armor_core::build::build_context;
use armor_core::diff::{describe_changes, diff_trees, verify_diff_round_trip};
use armor_core::errors::{ArmorError, Result};
use armor_core::model::NormalizedContext;
use armor_core::report::{group_records, html::render_html_report, json::to_json_4sp};
use armor_frontend::{HeaderParser, ParseConfig};

use crate::{Cli, ReportFormat};

const BASE_REVISION: &str = "base";
const HEAD_REVISION: &str = "head";

/// Contexts built for the current job, keyed by revision label.
///
/// Each job owns exactly one context per revision for the duration of the
/// diff. Requesting a revision that was never populated is a logic error,
/// not a recoverable condition, and aborts the run.
#[derive(Default)]
struct JobContexts {
    contexts: HashMap<&'static str, NormalizedContext>,
}

impl JobContexts {
    fn insert(&mut self, revision: &'static str, context: NormalizedContext) {
        self.contexts.insert(revision, context);
    }

    fn take(&mut self, revision: &'static str, path: &Path) -> Result<NormalizedContext> {
        self.contexts
            .remove(revision)
            .ok_or_else(|| ArmorError::MissingContext {
                file: path.display().to_string(),
            })
    }
}

/// One header pair to process.
#[derive(Debug, Clone)]
pub struct HeaderJob {
    /// Header name as shown in the report's `headerfile` column.
    pub name: String,
    pub base_path: PathBuf,
    pub head_path: PathBuf,
}

/// Resolve the command line into the list of header jobs.
pub fn resolve_jobs(cli: &Cli) -> Vec<HeaderJob> {
    if cli.headers.is_empty() {
        let name = cli
            .base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| cli.base.display().to_string());
        return vec![HeaderJob {
            name,
            base_path: cli.base.clone(),
            head_path: cli.head.clone(),
        }];
    }

    cli.headers
        .iter()
        .map(|header| {
            let relative = match &cli.header_dir {
                Some(dir) => dir.join(header),
                None => PathBuf::from(header),
            };
            HeaderJob {
                name: header.clone(),
                base_path: cli.base.join(&relative),
                head_path: cli.head.join(&relative),
            }
        })
        .collect()
}

/// File-name stem for report outputs: header name with every
/// non-alphanumeric character mapped to `_`.
fn report_stem(header_name: &str) -> String {
    let stem = Path::new(header_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| header_name.to_string());
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| ArmorError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Run every job. Parse failures skip the header; I/O failures abort the
/// run with a non-zero exit.
pub fn execute(cli: &Cli) -> Result<()> {
    let parser = HeaderParser::new(ParseConfig {
        include_dirs: cli.include_dirs.clone(),
        macro_defs: cli.macro_defs.clone(),
        resource_path: cli.resource_path.clone(),
    });

    for job in resolve_jobs(cli) {
        match process_header(&parser, &job, cli) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                warn!(header = %job.name, "skipping header: {e}");
            }
            Err(e) => {
                error!(header = %job.name, "failed: {e}");
                return Err(e);
            }
        }
    }

    Ok(())
}

/// One sequential job: parse base, parse head, diff, describe, emit. The
/// contexts are dropped once the diff tree exists; the diff tree holds no
/// references back into them.
fn process_header(parser: &HeaderParser, job: &HeaderJob, cli: &Cli) -> Result<()> {
    let base = parser.parse_file(&job.base_path)?;
    let head = parser.parse_file(&job.head_path)?;

    let mut contexts = JobContexts::default();
    contexts.insert(BASE_REVISION, build_context(&base, cli.exclude.clone()));
    contexts.insert(HEAD_REVISION, build_context(&head, cli.exclude.clone()));

    let diffs = {
        let base_ctx = contexts.take(BASE_REVISION, &job.base_path)?;
        let head_ctx = contexts.take(HEAD_REVISION, &job.head_path)?;
        diff_trees(&base_ctx, &head_ctx)
    };
    verify_diff_round_trip(&diffs)?;

    let stem = report_stem(&job.name);

    if cli.dump_ast_diff {
        let dump_path = cli.output_dir.join(format!("ast_diff_output_{stem}.json"));
        write_output(&dump_path, &to_json_4sp(&diffs)?)?;
        info!(path = %dump_path.display(), "wrote AST diff dump");
    }

    let rows = describe_changes(&diffs, &job.name);
    let grouped = group_records(&rows);

    let html_path = cli.output_dir.join(format!("api_diff_report_{stem}.html"));
    write_output(&html_path, &render_html_report(&grouped))?;
    info!(path = %html_path.display(), records = grouped.len(), "wrote HTML report");

    if cli.report == ReportFormat::Json {
        let json_path = cli.output_dir.join(format!("api_diff_report_{stem}.json"));
        write_output(&json_path, &to_json_4sp(&grouped)?)?;
        info!(path = %json_path.display(), "wrote JSON report");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli_from(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_single_pair_job() {
        let cli = cli_from(&["armor", "v1/mylib.h", "v2/mylib.h"]);
        let jobs = resolve_jobs(&cli);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "mylib.h");
        assert_eq!(jobs[0].base_path, PathBuf::from("v1/mylib.h"));
    }

    #[test]
    fn test_named_headers_with_dir() {
        let cli = cli_from(&[
            "armor",
            "base_root",
            "head_root",
            "power.h",
            "--header-dir",
            "include",
        ]);
        let jobs = resolve_jobs(&cli);
        assert_eq!(jobs[0].base_path, PathBuf::from("base_root/include/power.h"));
        assert_eq!(jobs[0].head_path, PathBuf::from("head_root/include/power.h"));
    }

    #[test]
    fn test_report_stem_sanitises() {
        assert_eq!(report_stem("mylib.h"), "mylib");
        assert_eq!(report_stem("my-lib.v2.h"), "my_lib_v2");
    }

    #[test]
    fn test_missing_context_is_raised_not_swallowed() {
        let mut contexts = JobContexts::default();
        contexts.insert(BASE_REVISION, NormalizedContext::new());

        let path = PathBuf::from("v1/mylib.h");
        assert!(contexts.take(BASE_REVISION, &path).is_ok());

        // a second take, or a never-populated revision, is a logic error
        let err = contexts.take(BASE_REVISION, &path).unwrap_err();
        assert!(matches!(err, ArmorError::MissingContext { .. }));
        assert!(!err.is_recoverable());

        let err = contexts.take(HEAD_REVISION, &path).unwrap_err();
        assert!(matches!(err, ArmorError::MissingContext { .. }));
    }
}
