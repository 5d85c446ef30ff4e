//! Front end for the C subset: lexer, parser and semantic checker.
//!
//! The parser resolves names while it builds the AST, so the [`Program`] it
//! returns carries a complete [`SymbolTable`]. The [`Checker`] then validates
//! calls, assignments and returns against that table.
//!
//! # Example
//!
//! ```ignore
//! use sbcc_engine::parser::{Checker, Parser};
//!
//! let program = Parser::new("int main() { return 0; }")?.parse()?;
//! Checker::check(&program)?;
//! ```

pub mod token;
pub mod lexer;
pub mod ast;
pub mod symbols;
pub mod parser;

pub mod checker;

// Re-exports for convenience
pub use token::{Span, Token};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, ParseErrorKind, Parser, Program};
pub use symbols::{CType, FunctionType, IntKind, Symbol, SymbolId, SymbolKind, SymbolTable};

pub use checker::{CheckError, Checker};
