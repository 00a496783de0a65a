#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

mod commands;
mod config;
mod logging;

use clap::Parser;
use config::{BuildFlags, Config, FileConfig};
use esdown_parser::Target;
use miette::Result;
use std::path::PathBuf;

/// Stack for the worker threads that parse. Nesting up to the parser's
/// depth limit needs more than the platform default in debug builds.
const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "esdown")]
#[command(author, version, about = "Parse, down-level and minify modern JavaScript", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Transpile files for a target edition
    Build {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write outputs into this directory instead of stdout
        #[arg(short, long, value_name = "DIR")]
        outdir: Option<PathBuf>,

        /// Target edition (es5, es2015..es2020, esnext)
        #[arg(short, long, env = "ESDOWN_TARGET")]
        target: Option<Target>,

        /// Shorten local names and print compact output
        #[arg(long)]
        minify: bool,

        /// With --minify, also rename non-exported top-level bindings
        #[arg(long)]
        mangle_top_level: bool,

        /// Read settings from a JSON config file (flags take precedence)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Parse and resolve files, reporting errors without output
    Check {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    if let Err(error) = rayon::ThreadPoolBuilder::new().stack_size(WORKER_STACK_SIZE).build_global() {
        tracing::debug!(%error, "keeping the existing thread pool");
    }

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Build {
            inputs,
            outdir,
            target,
            minify,
            mangle_top_level,
            config: config_file,
        }) => {
            let span = tracing::info_span!("build", cmd = "build", cwd = %cwd.display());
            let _guard = span.enter();

            let mut config = config;
            if let Some(path) = config_file {
                let file = FileConfig::load(&config.resolve(&path))?;
                config = config.with_file(&file);
            }
            let flags = BuildFlags {
                target,
                minify,
                mangle_top_level,
                outdir,
            };
            let action = commands::build::BuildAction {
                inputs,
                config: config.with_flags(&flags),
            };
            commands::build::run(action, cli.json)
        }
        Some(Commands::Check { inputs }) => {
            let span = tracing::info_span!("check", cmd = "check", cwd = %cwd.display());
            let _guard = span.enter();
            commands::check::run(&cwd, &inputs, cli.json)
        }
    }
}
