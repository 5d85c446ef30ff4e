//! Token definitions for the SBCC C subset.
//!
//! This module defines all tokens that can appear in source code,
//! including keywords, operators, literals, and special tokens.

use std::fmt;

/// A token of the C subset.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Type keywords
    Int,
    Char,
    Short,
    Long,
    Void,
    Unsigned,
    Signed,
    Const,

    // Control flow
    Return,
    If,
    Else,
    While,
    For,

    // Literals
    Identifier(String),
    IntLiteral(i64),
    StringLiteral(String),

    // Compound assignment
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,

    // Multi-character operators
    PlusPlus,
    MinusMinus,
    LessLess,
    GreaterGreater,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    BangEqual,
    AmpAmp,
    PipePipe,

    // Single-character operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    Less,
    Greater,
    Equal,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,

    Eof,
}

impl Token {
    /// Whether this token can begin a type specifier.
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            Token::Int
                | Token::Char
                | Token::Short
                | Token::Long
                | Token::Void
                | Token::Unsigned
                | Token::Signed
                | Token::Const
        )
    }
}

/// Source location of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
            column: if self.line <= other.line {
                self.column
            } else {
                other.column
            },
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Int => "int",
            Token::Char => "char",
            Token::Short => "short",
            Token::Long => "long",
            Token::Void => "void",
            Token::Unsigned => "unsigned",
            Token::Signed => "signed",
            Token::Const => "const",
            Token::Return => "return",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::For => "for",
            Token::Identifier(name) => return write!(f, "identifier '{}'", name),
            Token::IntLiteral(n) => return write!(f, "integer {}", n),
            Token::StringLiteral(s) => return write!(f, "string {:?}", s),
            Token::PlusEqual => "+=",
            Token::MinusEqual => "-=",
            Token::StarEqual => "*=",
            Token::SlashEqual => "/=",
            Token::PercentEqual => "%=",
            Token::LessLessEqual => "<<=",
            Token::GreaterGreaterEqual => ">>=",
            Token::AmpEqual => "&=",
            Token::PipeEqual => "|=",
            Token::CaretEqual => "^=",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::LessLess => "<<",
            Token::GreaterGreater => ">>",
            Token::LessEqual => "<=",
            Token::GreaterEqual => ">=",
            Token::EqualEqual => "==",
            Token::BangEqual => "!=",
            Token::AmpAmp => "&&",
            Token::PipePipe => "||",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Amp => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::Tilde => "~",
            Token::Bang => "!",
            Token::Less => "<",
            Token::Greater => ">",
            Token::Equal => "=",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Eof => "end of file",
        };
        write!(f, "'{}'", text)
    }
}
