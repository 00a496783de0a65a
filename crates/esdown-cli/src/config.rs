//! Runtime configuration for the esdown CLI.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional JSON config file (`--config esdown.json`), and flags.

use std::path::{Path, PathBuf};

use esdown_parser::{Target, TargetConfig};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory that relative paths are resolved against.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = WARN, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Target and minification settings handed to the pipeline.
    pub target: TargetConfig,

    /// Directory for generated files; `None` prints to stdout.
    pub outdir: Option<PathBuf>,
}

impl Config {
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            json_logs: false,
            verbosity: 0,
            target: TargetConfig::default(),
            outdir: None,
        }
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Apply a config file's settings.
    #[must_use]
    pub fn with_file(mut self, file: &FileConfig) -> Self {
        if let Some(target) = file.target {
            self.target.target = target;
        }
        if let Some(minify) = file.minify {
            self.target.minify = minify;
        }
        if let Some(mangle) = file.mangle_top_level {
            self.target.mangle_top_level = mangle;
        }
        if let Some(outdir) = &file.outdir {
            self.outdir = Some(self.resolve(outdir));
        }
        self
    }

    /// Apply command-line overrides. Boolean flags can only switch a
    /// setting on.
    #[must_use]
    pub fn with_flags(mut self, flags: &BuildFlags) -> Self {
        if let Some(target) = flags.target {
            self.target.target = target;
        }
        self.target.minify |= flags.minify;
        self.target.mangle_top_level |= flags.mangle_top_level;
        if let Some(outdir) = &flags.outdir {
            self.outdir = Some(self.resolve(outdir));
        }
        self
    }

    /// Resolve `path` against the working directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Flags shared by the commands that run the pipeline.
#[derive(Debug, Clone, Default)]
pub struct BuildFlags {
    pub target: Option<Target>,
    pub minify: bool,
    pub mangle_top_level: bool,
    pub outdir: Option<PathBuf>,
}

/// Contents of an `esdown.json` file.
///
/// ```json
/// { "target": "es5", "minify": true, "mangleTopLevel": false, "outdir": "dist" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub target: Option<Target>,
    pub minify: Option<bool>,
    pub mangle_top_level: Option<bool>,
    pub outdir: Option<PathBuf>,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).wrap_err_with(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).into_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_config_parses_camel_case() {
        let file = FileConfig::parse(r#"{"target": "es2017", "mangleTopLevel": true}"#).unwrap();
        assert_eq!(file.target, Some(Target::ES2017));
        assert_eq!(file.mangle_top_level, Some(true));
        assert_eq!(file.minify, None);
    }

    #[test]
    fn test_file_config_rejects_unknown_keys() {
        assert!(FileConfig::parse(r#"{"targte": "es5"}"#).is_err());
        assert!(FileConfig::parse(r#"{"target": "es3"}"#).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            target: Some(Target::ES5),
            minify: Some(true),
            mangle_top_level: None,
            outdir: Some(PathBuf::from("dist")),
        };
        let flags = BuildFlags {
            target: Some(Target::ES2018),
            outdir: Some(PathBuf::from("/tmp/out")),
            ..BuildFlags::default()
        };
        let config = Config::new(PathBuf::from("/work")).with_file(&file).with_flags(&flags);
        assert_eq!(config.target.target, Target::ES2018);
        assert!(config.target.minify);
        assert!(!config.target.mangle_top_level);
        assert_eq!(config.outdir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_relative_outdir_uses_cwd() {
        let file = FileConfig {
            outdir: Some(PathBuf::from("dist")),
            ..FileConfig::default()
        };
        let config = Config::new(PathBuf::from("/work")).with_file(&file);
        assert_eq!(config.outdir, Some(PathBuf::from("/work/dist")));
        assert_eq!(config.target.target, Target::ESNext);
    }
}
