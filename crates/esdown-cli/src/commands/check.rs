//! `esdown check`: parse and resolve without generating code.

use std::path::{Path, PathBuf};

use esdown_parser::{parse_module, resolve};
use miette::{IntoDiagnostic, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::{print_errors, read_source, resolve_inputs, ErrorJson, FileError, RESULT_SCHEMA_VERSION};

#[derive(Serialize)]
struct CheckResultJson {
    schema_version: u32,
    ok: bool,
    files: Vec<CheckFileJson>,
    notes: Vec<String>,
}

#[derive(Serialize)]
struct CheckFileJson {
    input: String,
    ok: bool,
    scopes: usize,
    bindings: usize,
    errors: Vec<ErrorJson>,
}

/// Scope and binding counts of a module that checked clean.
struct Stats {
    scopes: usize,
    bindings: usize,
}

pub fn run(cwd: &Path, inputs: &[PathBuf], json: bool) -> Result<()> {
    let inputs = resolve_inputs(cwd, inputs);
    let outcomes: Vec<(PathBuf, Result<Stats, FileError>)> =
        inputs.par_iter().map(|input| (input.clone(), check_file(input))).collect();
    let ok = outcomes.iter().all(|(_, result)| result.is_ok());

    if json {
        let files = outcomes
            .iter()
            .map(|(input, result)| {
                let (scopes, bindings, errors) = match result {
                    Ok(stats) => (stats.scopes, stats.bindings, Vec::new()),
                    Err(error) => (0, 0, error.to_json()),
                };
                CheckFileJson {
                    input: input.display().to_string(),
                    ok: errors.is_empty(),
                    scopes,
                    bindings,
                    errors,
                }
            })
            .collect();
        let result = CheckResultJson {
            schema_version: RESULT_SCHEMA_VERSION,
            ok,
            files,
            notes: Vec::new(),
        };
        println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    } else {
        for (input, result) in &outcomes {
            match result {
                Ok(_) => eprintln!("{}: ok", input.display()),
                Err(error) => print_errors(error),
            }
        }
    }

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn check_file(input: &Path) -> Result<Stats, FileError> {
    let source = read_source(input)?;
    let filename = input.display().to_string();
    let mut module = match parse_module(&filename, &source) {
        Ok(module) => module,
        Err(errors) => return Err(FileError::Syntax { errors, source }),
    };
    if let Err(errors) = resolve(&mut module) {
        return Err(FileError::Syntax { errors, source });
    }
    debug!(file = %filename, scopes = module.scopes.len(), refs = module.refs.len(), "checked");
    Ok(Stats {
        scopes: module.scopes.len(),
        bindings: module.refs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_file_finds_redeclaration() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dup.js");
        std::fs::write(&file, "let a = 1;\nlet a = 2;\n").unwrap();

        let Err(error) = check_file(&file) else {
            panic!("redeclaration should fail");
        };
        let json = error.to_json();
        assert_eq!(json[0].line, Some(2));
    }

    #[test]
    fn test_check_file_counts_scopes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ok.js");
        std::fs::write(&file, "function f(a) { return a; }").unwrap();

        let Ok(stats) = check_file(&file) else {
            panic!("valid module should check");
        };
        assert!(stats.scopes >= 2);
        assert!(stats.bindings >= 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let Err(error) = check_file(Path::new("/definitely/not/here.js")) else {
            panic!("missing file should fail");
        };
        assert_eq!(error.to_json()[0].code, "ESDOWN_IO_ERROR");
    }
}
