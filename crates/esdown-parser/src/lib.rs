//! esdown-parser: JavaScript (ES2015–ES2020 + Flow + JSX) parser and
//! down-leveling transpiler.
//!
//! # Pipeline
//!
//! 1. **Parse**: an on-demand lexer feeds a recursive-descent parser.
//!    The lexer is driven by the parser, so `/` and `<` are scanned as
//!    regex or JSX only where the grammar allows it.
//! 2. **Resolve**: one walk binds every identifier to a
//!    [`RefId`](scope::RefId) in flat scope and ref arenas.
//! 3. **Lower**: syntax newer than the [`Target`] is rewritten in place.
//! 4. **Mangle** (optional): local bindings get short names.
//! 5. **Generate**: [`Codegen`] prints the module, dropping Flow types.
//!
//! # Example
//!
//! ```
//! use esdown_parser::{parse_module, optimize, Codegen, CodegenOptions, Target, TargetConfig};
//!
//! let mut module = parse_module("input.js", "const f = (a, b = 1) => a + b;").unwrap();
//! optimize(&mut module, &TargetConfig::new(Target::ES5)).unwrap();
//! let output = Codegen::new(&module, CodegenOptions::default()).generate();
//! assert!(output.contains("function"));
//! ```

mod ast;
mod codegen;
mod config;
mod error;
mod flow;
mod jsx;
mod lexer;
mod lower;
mod mangle;
mod optimizer;
mod parser;
mod span;
mod token;

pub mod scope;
pub mod walk;

use tracing::debug_span;

// Re-exports
pub use ast::*;
pub use codegen::{format_number, Codegen, CodegenOptions};
pub use config::{Target, TargetConfig, UnknownTarget};
pub use error::{ErrorList, ParseError};
pub use lexer::{LexContext, Lexer};
pub use lower::lower_module;
pub use mangle::{is_js_reserved, mangle_module, NameGenerator};
pub use optimizer::{optimize, resolve, transpile};
pub use parser::{Parser, ParserOptions, MAX_NESTING_DEPTH};
pub use span::{LineIndex, Position, Span};
pub use token::{TemplateChunk, Token, TokenKind};

/// The parser crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse a module with the default options (JSX and Flow as enabled by
/// crate features).
pub fn parse_module(filename: &str, source: &str) -> Result<Module, ErrorList> {
    parse_module_with(filename, source, ParserOptions::default())
}

/// Parse a module with explicit parser options.
pub fn parse_module_with(filename: &str, source: &str, options: ParserOptions) -> Result<Module, ErrorList> {
    let _span = debug_span!("parse_module", file = filename, bytes = source.len()).entered();
    Parser::new(source, options).parse(filename)
}

/// Parse, optimize for `config`, and print.
pub fn transform(
    filename: &str,
    source: &str,
    config: &TargetConfig,
    options: CodegenOptions,
) -> Result<String, ErrorList> {
    let mut module = parse_module(filename, source)?;
    optimize(&mut module, config)?;
    Ok(Codegen::new(&module, options).generate())
}
