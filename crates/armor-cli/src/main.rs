//! ARMOR CLI
//!
//! Compares two revisions of a C/C++ public header and writes HTML/JSON
//! reports describing every API surface change.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use armor_core::logging::{self, LogLevel, Profile};

mod orchestrate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// HTML report only
    Html,
    /// JSON report in addition to HTML
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    #[value(name = "ERROR", alias = "error")]
    Error,
    #[value(name = "LOG", alias = "log")]
    Log,
    #[value(name = "INFO", alias = "info")]
    Info,
    #[value(name = "DEBUG", alias = "debug")]
    Debug,
}

impl From<LogLevelArg> for LogLevel {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Log => LogLevel::Log,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "armor")]
#[command(about = "Compare two revisions of a C/C++ header and report API surface changes")]
pub struct Cli {
    /// Base header path, or the base root directory when header names follow
    pub base: PathBuf,

    /// Head header path, or the head root directory when header names follow
    pub head: PathBuf,

    /// Header basenames resolved against BASE and HEAD
    pub headers: Vec<String>,

    /// Directory (relative to BASE and HEAD) in which named headers are resolved
    #[arg(long = "header-dir", value_name = "DIR")]
    pub header_dir: Option<PathBuf>,

    /// Report format; json writes both the HTML and the JSON report
    #[arg(short = 'r', long = "report", value_enum, default_value = "html")]
    pub report: ReportFormat,

    /// Front-end resource directory
    #[arg(short = 'p', long = "resource-path", value_name = "DIR")]
    pub resource_path: Option<PathBuf>,

    /// Include directory forwarded to the front-end (repeatable)
    #[arg(short = 'I', value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,

    /// Macro definitions forwarded to the front-end
    #[arg(short = 'm', value_name = "DEFS")]
    pub macro_defs: Vec<String>,

    /// Also write the raw diff tree to ast_diff_output_<header>.json
    #[arg(long = "dump-ast-diff")]
    pub dump_ast_diff: bool,

    /// Qualified name excluded from diff reporting (repeatable)
    #[arg(long = "exclude", value_name = "QNAME")]
    pub exclude: Vec<String>,

    /// Output directory for generated reports
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long = "log-level", value_enum, default_value = "LOG")]
    pub log_level: LogLevelArg,
}

fn main() {
    let cli = Cli::parse();
    logging::init(Profile::Development, cli.log_level.into());

    if let Err(e) = orchestrate::execute(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
