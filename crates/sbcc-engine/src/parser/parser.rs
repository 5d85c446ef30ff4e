//! Parser for the C subset
//!
//! This module implements a recursive descent parser that transforms
//! a token stream from the lexer into an Abstract Syntax Tree (AST),
//! resolving every identifier against lexical scopes as it goes.

pub mod decl;
pub mod error;
pub mod expr;
pub mod precedence;
pub mod recovery;
pub mod stmt;

use crate::parser::ast::{ExternalDecl, FunctionDef, Scope, TranslationUnit};
use crate::parser::lexer::{LexError, Lexer};
use crate::parser::symbols::{Symbol, SymbolId, SymbolKind, SymbolTable};
use crate::parser::token::{Span, Token};
use rustc_hash::FxHashMap;

pub use error::{ParseError, ParseErrorKind};

/// Output of the front end: the AST plus the symbol table it refers to.
#[derive(Debug, Clone)]
pub struct Program {
    pub unit: TranslationUnit,
    pub symbols: SymbolTable,
}

impl Program {
    /// Function definitions in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.unit.items.iter().filter_map(|item| match item {
            ExternalDecl::Function(f) => Some(f),
            _ => None,
        })
    }
}

/// One lexical block scope during parsing.
#[derive(Debug, Default)]
struct ScopeFrame {
    names: FxHashMap<String, SymbolId>,
    scope: Scope,
}

/// Parser state for the C subset.
pub struct Parser {
    /// Pre-tokenized input
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,

    /// Accumulated parse errors (allows continuing after errors)
    errors: Vec<ParseError>,

    /// Every symbol declared so far
    symbols: SymbolTable,

    /// Local scopes, innermost last
    scopes: Vec<ScopeFrame>,
}

impl Parser {
    /// Create a new parser from source code.
    pub fn new(source: &str) -> Result<Self, Vec<LexError>> {
        let tokens = Lexer::new(source).tokenize()?;

        Ok(Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            symbols: SymbolTable::new(),
            scopes: Vec::new(),
        })
    }

    /// Parse the entire source file into a [`Program`].
    ///
    /// Returns the program on success, or all accumulated errors on failure.
    pub fn parse(mut self) -> Result<Program, Vec<ParseError>> {
        let start_span = self.current_span();
        let mut items = Vec::new();

        while !self.at_eof() {
            match decl::parse_external_decl(&mut self) {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.errors.push(err);
                    self.scopes.clear();
                    recovery::sync_to_declaration_boundary(&mut self);
                }
            }
        }

        let span = match items.last() {
            Some(last) => self.combine_spans(&start_span, last.span()),
            None => start_span,
        };

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        log::debug!(
            "parsed {} top-level declarations, {} symbols",
            items.len(),
            self.symbols.len()
        );

        Ok(Program {
            unit: TranslationUnit { items, span },
            symbols: self.symbols,
        })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Peek at the next token (lookahead).
    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(tok, _)| tok)
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].1
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    /// Check if we've reached EOF.
    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Consume the current token if it matches the expected kind.
    pub fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(vec![expected]))
        }
    }

    /// Consume an identifier and return its name.
    pub fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.current() {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected_token(vec![Token::Identifier(String::new())])),
        }
    }

    /// Create an "unexpected token" error at the current position.
    pub fn unexpected_token(&self, expected: Vec<Token>) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected, span)
        } else {
            ParseError::unexpected_token(expected, self.current().clone(), span)
        }
    }

    /// Record an error and keep parsing.
    pub fn record(&mut self, err: ParseError) {
        self.errors.push(err);
    }

    /// Combine two spans into a single span.
    pub fn combine_spans(&self, start: &Span, end: &Span) -> Span {
        Span {
            start: start.start,
            end: end.end,
            line: start.line,
            column: start.column,
        }
    }

    // ========================================================================
    // Scopes and symbols
    // ========================================================================

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(ScopeFrame::default());
    }

    /// Pop the innermost scope and return the locals it declared.
    pub fn pop_scope(&mut self) -> Scope {
        self.scopes.pop().map(|frame| frame.scope).unwrap_or_default()
    }

    pub fn in_local_scope(&self) -> bool {
        !self.scopes.is_empty()
    }

    /// Declare a local or parameter in the innermost scope.
    ///
    /// A same-scope redeclaration still gets a fresh symbol; the checker reports it.
    pub fn declare_local(&mut self, symbol: Symbol) -> SymbolId {
        let name = symbol.name.clone();
        let id = self.symbols.push(symbol);
        if let Some(frame) = self.scopes.last_mut() {
            frame.names.insert(name, id);
            frame.scope.locals.push(id);
        }
        id
    }

    /// Resolve a name: innermost local scope first, then globals.
    pub fn resolve(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.names.get(name).copied())
            .or_else(|| self.symbols.lookup_global(name))
    }

    /// Find an existing function symbol to merge a prototype or definition into.
    pub fn existing_function(&self, name: &str) -> Option<SymbolId> {
        self.symbols
            .iter()
            .find(|(_, s)| s.kind == SymbolKind::Function && s.name == name)
            .map(|(id, _)| id)
    }
}
