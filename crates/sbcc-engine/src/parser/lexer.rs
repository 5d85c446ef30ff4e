//! Lexer for the SBCC C subset.
//!
//! This module implements the lexer on top of the logos library.
//! It converts source code into a stream of tokens with line and column
//! information for every token.

use crate::parser::token::{Span, Token};
use logos::Logos;
use thiserror::Error;

/// Logos-based token enum for lexing.
///
/// This enum is used internally by logos for efficient tokenization.
/// It's converted to our main Token enum after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Whitespace,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*", lex_block_comment)]
    BlockComment,

    // Keywords (must come before identifiers)
    #[token("int")]
    Int,
    #[token("char")]
    Char,
    #[token("short")]
    Short,
    #[token("long")]
    Long,
    #[token("void")]
    Void,
    #[token("unsigned")]
    Unsigned,
    #[token("signed")]
    Signed,
    #[token("const")]
    Const,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"0[xX][0-9a-fA-F]+[uUlL]*", parse_hex)]
    #[regex(r"[0-9]+[uUlL]*", parse_int)]
    #[regex(r"'([^'\\\n]|\\.)'", parse_char)]
    IntLiteral(i64),

    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    StringLiteral(String),

    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("<<=")]
    LessLessEqual,
    #[token(">>=")]
    GreaterGreaterEqual,
    #[token("&=")]
    AmpEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,

    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("<<")]
    LessLess,
    #[token(">>")]
    GreaterGreater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("=")]
    Equal,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
}

fn lex_block_comment(lex: &mut logos::Lexer<'_, LogosToken>) -> logos::Skip {
    let remainder = lex.remainder();
    if let Some(end) = remainder.find("*/") {
        lex.bump(end + 2);
    } else {
        // Unterminated comment runs to the end of the input
        lex.bump(remainder.len());
    }
    logos::Skip
}

fn strip_int_suffix(s: &str) -> &str {
    s.trim_end_matches(['u', 'U', 'l', 'L'])
}

fn parse_hex(lex: &mut logos::Lexer<'_, LogosToken>) -> Option<i64> {
    let digits = strip_int_suffix(&lex.slice()[2..]);
    u64::from_str_radix(digits, 16).ok().map(|v| v as i64)
}

fn parse_int(lex: &mut logos::Lexer<'_, LogosToken>) -> Option<i64> {
    let digits = strip_int_suffix(lex.slice());
    digits
        .parse::<i64>()
        .ok()
        .or_else(|| digits.parse::<u64>().ok().map(|v| v as i64))
}

fn parse_char(lex: &mut logos::Lexer<'_, LogosToken>) -> Option<i64> {
    let s = lex.slice();
    let value = unescape(&s[1..s.len() - 1]);
    let mut bytes = value.bytes();
    match (bytes.next(), bytes.next()) {
        (Some(b), None) => Some(b as i64),
        _ => None,
    }
}

fn parse_string(lex: &mut logos::Lexer<'_, LogosToken>) -> Option<String> {
    let s = lex.slice();
    Some(unescape(&s[1..s.len() - 1]))
}

fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('0') => result.push('\0'),
            Some(other) => result.push(other),
            None => break,
        }
    }

    result
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unexpected character '{char}' at {}:{}", span.line, span.column)]
    UnexpectedCharacter { char: char, span: Span },

    #[error("Unterminated string literal at {}:{}", span.line, span.column)]
    UnterminatedString { span: Span },

    #[error("Invalid number '{text}' at {}:{}", span.line, span.column)]
    InvalidNumber { text: String, span: Span },
}

impl LexError {
    /// Get the span of this error
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::InvalidNumber { span, .. } => span,
        }
    }
}

/// Byte offsets of every line start, for offset to line/column mapping.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    fn span(&self, source: &str, start: usize, end: usize) -> Span {
        let line = self.starts.partition_point(|&s| s <= start);
        let line_start = self.starts[line - 1];
        let column = source[line_start..start].chars().count() + 1;
        Span::new(start, end, line as u32, column as u32)
    }
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the whole input, ending the stream with [`Token::Eof`].
    ///
    /// All lexical errors are collected before returning.
    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let lines = LineIndex::new(self.source);
        let mut lexer = LogosToken::lexer(self.source);

        while let Some(result) = lexer.next() {
            let range = lexer.span();
            let span = lines.span(self.source, range.start, range.end);

            match result {
                Ok(logos_token) => {
                    let token = Self::convert_token(logos_token);
                    self.tokens.push((token, span));
                }
                Err(()) => {
                    let text = &self.source[range.clone()];
                    let error = match text.chars().next() {
                        Some('"') => LexError::UnterminatedString { span },
                        Some(c) if c.is_ascii_digit() || c == '\'' => LexError::InvalidNumber {
                            text: text.to_string(),
                            span,
                        },
                        Some(c) => LexError::UnexpectedCharacter { char: c, span },
                        None => LexError::UnexpectedCharacter { char: '\0', span },
                    };
                    self.errors.push(error);
                }
            }
        }

        let len = self.source.len();
        let eof_span = lines.span(self.source, len, len);
        self.tokens.push((Token::Eof, eof_span));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn convert_token(logos_token: LogosToken) -> Token {
        match logos_token {
            LogosToken::Int => Token::Int,
            LogosToken::Char => Token::Char,
            LogosToken::Short => Token::Short,
            LogosToken::Long => Token::Long,
            LogosToken::Void => Token::Void,
            LogosToken::Unsigned => Token::Unsigned,
            LogosToken::Signed => Token::Signed,
            LogosToken::Const => Token::Const,
            LogosToken::Return => Token::Return,
            LogosToken::If => Token::If,
            LogosToken::Else => Token::Else,
            LogosToken::While => Token::While,
            LogosToken::For => Token::For,
            LogosToken::Identifier(s) => Token::Identifier(s),
            LogosToken::IntLiteral(n) => Token::IntLiteral(n),
            LogosToken::StringLiteral(s) => Token::StringLiteral(s),
            LogosToken::PlusEqual => Token::PlusEqual,
            LogosToken::MinusEqual => Token::MinusEqual,
            LogosToken::StarEqual => Token::StarEqual,
            LogosToken::SlashEqual => Token::SlashEqual,
            LogosToken::PercentEqual => Token::PercentEqual,
            LogosToken::LessLessEqual => Token::LessLessEqual,
            LogosToken::GreaterGreaterEqual => Token::GreaterGreaterEqual,
            LogosToken::AmpEqual => Token::AmpEqual,
            LogosToken::PipeEqual => Token::PipeEqual,
            LogosToken::CaretEqual => Token::CaretEqual,
            LogosToken::PlusPlus => Token::PlusPlus,
            LogosToken::MinusMinus => Token::MinusMinus,
            LogosToken::LessLess => Token::LessLess,
            LogosToken::GreaterGreater => Token::GreaterGreater,
            LogosToken::LessEqual => Token::LessEqual,
            LogosToken::GreaterEqual => Token::GreaterEqual,
            LogosToken::EqualEqual => Token::EqualEqual,
            LogosToken::BangEqual => Token::BangEqual,
            LogosToken::AmpAmp => Token::AmpAmp,
            LogosToken::PipePipe => Token::PipePipe,
            LogosToken::Plus => Token::Plus,
            LogosToken::Minus => Token::Minus,
            LogosToken::Star => Token::Star,
            LogosToken::Slash => Token::Slash,
            LogosToken::Percent => Token::Percent,
            LogosToken::Amp => Token::Amp,
            LogosToken::Pipe => Token::Pipe,
            LogosToken::Caret => Token::Caret,
            LogosToken::Tilde => Token::Tilde,
            LogosToken::Bang => Token::Bang,
            LogosToken::Less => Token::Less,
            LogosToken::Greater => Token::Greater,
            LogosToken::Equal => Token::Equal,
            LogosToken::LeftParen => Token::LeftParen,
            LogosToken::RightParen => Token::RightParen,
            LogosToken::LeftBrace => Token::LeftBrace,
            LogosToken::RightBrace => Token::RightBrace,
            LogosToken::Semicolon => Token::Semicolon,
            LogosToken::Comma => Token::Comma,
            // Skipped by logos before conversion
            LogosToken::Whitespace | LogosToken::LineComment | LogosToken::BlockComment => {
                Token::Eof
            }
        }
    }
}
