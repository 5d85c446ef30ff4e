//! SBCC Engine
//!
//! This crate provides the complete sbcc compiler for a small C subset:
//! - **Parser**: Lexer, parser, symbol table, and semantic checker (`parser` module)
//! - **Compiler**: IR, lowering, optimizations, and AArch64 code generation (`compiler` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use sbcc_engine::{compile_source, CompileOptions, OptLevel};
//!
//! let output = compile_source(
//!     "int main() { return 2 + 3 * 4; }",
//!     &CompileOptions::new(OptLevel::Basic),
//! )?;
//! print!("{}", output.assembly);
//! ```

#![warn(rust_2018_idioms)]

/// Parser module: Lexer, parser, symbols, and checker
pub mod parser;

/// Compiler module: IR, optimizations, and code generation
pub mod compiler;

use std::path::Path;
use thiserror::Error;

// ============================================================================
// Re-exports
// ============================================================================

pub use parser::{
    CheckError, Checker, LexError, Lexer, ParseError, Parser, Program, Span, SymbolTable,
};

pub use compiler::{
    compile_program, ir, CompileError, CompileOptions, CompileOutput, CompileResult, OptLevel,
    OptStats, Optimizer, PrettyPrint,
};

/// Any failure between source text and assembly
#[derive(Debug, Error)]
pub enum Error {
    #[error("{} lexical error(s)", .0.len())]
    Lex(Vec<LexError>),

    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),

    #[error("{} semantic error(s)", .0.len())]
    Check(Vec<CheckError>),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// One line per diagnostic, with the source position when there is one
    pub fn diagnostics(&self) -> Vec<(Option<Span>, String)> {
        match self {
            Error::Lex(errors) => errors
                .iter()
                .map(|e| (Some(*e.span()), e.to_string()))
                .collect(),
            Error::Parse(errors) => errors
                .iter()
                .map(|e| (Some(e.span), e.message.clone()))
                .collect(),
            Error::Check(errors) => errors
                .iter()
                .map(|e| (Some(*e.span()), e.to_string()))
                .collect(),
            Error::Compile(e) => vec![(None, e.to_string())],
            Error::Io(e) => vec![(None, e.to_string())],
        }
    }
}

/// Compile C source text to AArch64 assembly
pub fn compile_source(source: &str, options: &CompileOptions) -> Result<CompileOutput, Error> {
    let parser = Parser::new(source).map_err(Error::Lex)?;
    let program = parser.parse().map_err(Error::Parse)?;
    log::debug!("parsed {} functions", program.functions().count());

    Checker::check(&program).map_err(Error::Check)?;
    log::debug!("checked program");

    Ok(compile_program(&program, options)?)
}

/// Read and compile a source file
pub fn compile_file(path: impl AsRef<Path>, options: &CompileOptions) -> Result<CompileOutput, Error> {
    let path = path.as_ref();
    log::debug!("compiling {}", path.display());
    let source = std::fs::read_to_string(path)?;
    compile_source(&source, options)
}
