//! `esdown build` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use esdown_parser::{transform, CodegenOptions, TargetConfig};
use miette::{IntoDiagnostic, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::{print_errors, read_source, resolve_inputs, ErrorJson, FileError, RESULT_SCHEMA_VERSION};
use crate::config::Config;

/// Build command action.
#[derive(Debug, Clone)]
pub struct BuildAction {
    pub inputs: Vec<PathBuf>,
    pub config: Config,
}

/// Build result for JSON output.
#[derive(Serialize)]
struct BuildResultJson {
    schema_version: u32,
    ok: bool,
    target: String,
    minify: bool,
    counts: BuildCountsJson,
    files: Vec<BuildFileJson>,
    notes: Vec<String>,
}

#[derive(Serialize)]
struct BuildCountsJson {
    total: usize,
    succeeded: usize,
    failed: usize,
}

#[derive(Serialize)]
struct BuildFileJson {
    input: String,
    ok: bool,
    /// Written path, when building into an output directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    /// Generated code, when printing to stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    bytes: usize,
    duration_ms: u64,
    errors: Vec<ErrorJson>,
}

/// Outcome for one input file.
struct FileOutcome {
    input: PathBuf,
    output: Option<PathBuf>,
    result: Result<String, FileError>,
    duration_ms: u64,
}

/// Run the build command.
pub fn run(action: BuildAction, json: bool) -> Result<()> {
    let config = &action.config;
    let inputs = resolve_inputs(&config.cwd, &action.inputs);
    info!(files = inputs.len(), target = %config.target.target, minify = config.target.minify, "building");

    if let Some(outdir) = &config.outdir {
        std::fs::create_dir_all(outdir).into_diagnostic()?;
    }

    let outcomes: Vec<FileOutcome> = inputs
        .par_iter()
        .map(|input| build_file(input, &config.target, config.outdir.as_deref()))
        .collect();
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();

    if json {
        print_json(config, &outcomes)?;
    } else {
        print_human(&outcomes)?;
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn build_file(input: &Path, target: &TargetConfig, outdir: Option<&Path>) -> FileOutcome {
    let start = Instant::now();
    let output = outdir.map(|dir| output_path(dir, input));
    let result = compile(input, target).and_then(|code| {
        if let Some(path) = &output {
            std::fs::write(path, &code)
                .map_err(|e| FileError::Write(format!("Failed to write {}: {}", path.display(), e)))?;
            debug!(input = %input.display(), output = %path.display(), bytes = code.len(), "wrote file");
        }
        Ok(code)
    });
    FileOutcome {
        input: input.to_path_buf(),
        output,
        result,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn compile(input: &Path, target: &TargetConfig) -> Result<String, FileError> {
    let source = read_source(input)?;
    let filename = input.display().to_string();
    let options = CodegenOptions {
        minify: target.minify,
        ..CodegenOptions::default()
    };
    transform(&filename, &source, target, options).map_err(|errors| FileError::Syntax { errors, source })
}

/// `<outdir>/<file name of input>`.
fn output_path(outdir: &Path, input: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => outdir.join(name),
        None => outdir.join("out.js"),
    }
}

fn print_human(outcomes: &[FileOutcome]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    for outcome in outcomes {
        match (&outcome.result, &outcome.output) {
            (Ok(code), None) => stdout.write_all(code.as_bytes()).into_diagnostic()?,
            (Ok(code), Some(path)) => {
                eprintln!("{} -> {} ({} bytes)", outcome.input.display(), path.display(), code.len());
            }
            (Err(error), _) => print_errors(error),
        }
    }
    stdout.flush().into_diagnostic()
}

fn print_json(config: &Config, outcomes: &[FileOutcome]) -> Result<()> {
    let files: Vec<BuildFileJson> = outcomes
        .iter()
        .map(|outcome| {
            let (ok, bytes, code, errors) = match &outcome.result {
                Ok(code) => {
                    let printed = outcome.output.is_none().then(|| code.clone());
                    (true, code.len(), printed, Vec::new())
                }
                Err(error) => (false, 0, None, error.to_json()),
            };
            BuildFileJson {
                input: outcome.input.display().to_string(),
                ok,
                output: outcome.output.as_ref().filter(|_| ok).map(|p| p.display().to_string()),
                code,
                bytes,
                duration_ms: outcome.duration_ms,
                errors,
            }
        })
        .collect();

    let succeeded = files.iter().filter(|f| f.ok).count();
    let mut notes = Vec::new();
    if config.target.mangle_top_level && !config.target.minify {
        notes.push("mangle_top_level has no effect without minify".to_string());
    }

    let result = BuildResultJson {
        schema_version: RESULT_SCHEMA_VERSION,
        ok: succeeded == files.len(),
        target: config.target.target.to_string(),
        minify: config.target.minify,
        counts: BuildCountsJson {
            total: files.len(),
            succeeded,
            failed: files.len() - succeeded,
        },
        files,
        notes,
    };
    println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_keeps_file_name() {
        let path = output_path(Path::new("/out"), Path::new("/src/app/main.js"));
        assert_eq!(path, PathBuf::from("/out/main.js"));
    }

    #[test]
    fn test_compile_reports_syntax_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.js");
        std::fs::write(&file, "a +;").unwrap();

        let err = compile(&file, &TargetConfig::default()).unwrap_err();
        let json = err.to_json();
        assert!(!json.is_empty());
        assert_eq!(json[0].code, "ESDOWN_SYNTAX_ERROR");
        assert_eq!(json[0].line, Some(1));
    }

    #[test]
    fn test_build_file_writes_into_outdir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.js");
        std::fs::write(&input, "const f = () => 1;").unwrap();
        let outdir = dir.path().join("dist");
        std::fs::create_dir_all(&outdir).unwrap();

        let target = TargetConfig::new(esdown_parser::Target::ES5);
        let outcome = build_file(&input, &target, Some(&outdir));
        let code = outcome.result.unwrap();
        assert_eq!(outcome.output, Some(outdir.join("in.js")));
        assert_eq!(std::fs::read_to_string(outdir.join("in.js")).unwrap(), code);
        assert!(code.contains("function"), "{code}");
    }
}
