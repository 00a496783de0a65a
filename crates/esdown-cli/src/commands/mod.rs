pub mod build;
pub mod check;
pub mod version;

use std::path::{Path, PathBuf};

use esdown_parser::{ErrorList, ParseError};
use miette::{miette, LabeledSpan, NamedSource, Report};
use serde::Serialize;

/// Version of the `--json` result shape shared by `build` and `check`.
pub const RESULT_SCHEMA_VERSION: u32 = 1;

/// A positioned error in JSON output.
#[derive(Debug, Serialize)]
pub struct ErrorJson {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ErrorJson {
    pub fn io(message: String) -> Self {
        Self {
            code: "ESDOWN_IO_ERROR",
            message,
            line: None,
            column: None,
        }
    }

    pub fn syntax(error: &ParseError) -> Self {
        Self {
            code: "ESDOWN_SYNTAX_ERROR",
            message: error.message.clone(),
            line: Some(error.position.line),
            column: Some(error.position.column),
        }
    }
}

/// Why a file could not be processed.
#[derive(Debug)]
pub enum FileError {
    Read(String),
    Write(String),
    Syntax { errors: ErrorList, source: String },
}

impl FileError {
    pub fn to_json(&self) -> Vec<ErrorJson> {
        match self {
            Self::Read(message) | Self::Write(message) => vec![ErrorJson::io(message.clone())],
            Self::Syntax { errors, .. } => errors.iter().map(ErrorJson::syntax).collect(),
        }
    }

    /// Render as miette reports, one per syntax error, with the source
    /// line labeled.
    pub fn to_reports(&self) -> Vec<Report> {
        match self {
            Self::Read(message) | Self::Write(message) => vec![miette!("{}", message)],
            Self::Syntax { errors, source } => errors
                .iter()
                .map(|error| {
                    let start = error.span.start as usize;
                    let len = error.span.len() as usize;
                    miette!(
                        labels = vec![LabeledSpan::at(start..start + len, "here")],
                        "{}",
                        error.message
                    )
                    .with_source_code(NamedSource::new(errors.filename.clone(), source.clone()))
                })
                .collect(),
        }
    }
}

/// Read one input file.
pub fn read_source(path: &Path) -> Result<String, FileError> {
    std::fs::read_to_string(path).map_err(|e| FileError::Read(format!("Failed to read {}: {}", path.display(), e)))
}

/// Resolve the inputs against `cwd`, keeping their order.
pub fn resolve_inputs(cwd: &Path, inputs: &[PathBuf]) -> Vec<PathBuf> {
    inputs
        .iter()
        .map(|p| if p.is_absolute() { p.clone() } else { cwd.join(p) })
        .collect()
}

/// Print every file error to stderr.
pub fn print_errors(error: &FileError) {
    for report in error.to_reports() {
        eprintln!("{report:?}");
    }
}
