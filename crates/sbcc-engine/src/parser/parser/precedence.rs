//! Operator precedence table for expression parsing.
//!
//! Binary operators follow C precedence. Assignment is handled separately
//! by the expression parser since it is right-associative.

use crate::parser::ast::BinaryOperator;
use crate::parser::token::Token;

/// Operator precedence level (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None = 0,
    Assignment = 1,      // =, +=, -=, etc.
    LogicalOr = 2,       // ||
    LogicalAnd = 3,      // &&
    BitwiseOr = 4,       // |
    BitwiseXor = 5,      // ^
    BitwiseAnd = 6,      // &
    Equality = 7,        // ==, !=
    Relational = 8,      // <, >, <=, >=
    Shift = 9,           // <<, >>
    Additive = 10,       // +, -
    Multiplicative = 11, // *, /, %
    Unary = 12,          // -, ~, !, *, &, ++, --
}

impl Precedence {
    /// The next tighter level, used for left-associative operands.
    pub fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::LogicalOr,
            Precedence::LogicalOr => Precedence::LogicalAnd,
            Precedence::LogicalAnd => Precedence::BitwiseOr,
            Precedence::BitwiseOr => Precedence::BitwiseXor,
            Precedence::BitwiseXor => Precedence::BitwiseAnd,
            Precedence::BitwiseAnd => Precedence::Equality,
            Precedence::Equality => Precedence::Relational,
            Precedence::Relational => Precedence::Shift,
            Precedence::Shift => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative | Precedence::Unary => Precedence::Unary,
        }
    }
}

/// Get the precedence of a binary operator token.
pub fn get_precedence(token: &Token) -> Precedence {
    match token {
        Token::Equal
        | Token::PlusEqual
        | Token::MinusEqual
        | Token::StarEqual
        | Token::SlashEqual
        | Token::PercentEqual
        | Token::AmpEqual
        | Token::PipeEqual
        | Token::CaretEqual
        | Token::LessLessEqual
        | Token::GreaterGreaterEqual => Precedence::Assignment,

        Token::PipePipe => Precedence::LogicalOr,
        Token::AmpAmp => Precedence::LogicalAnd,
        Token::Pipe => Precedence::BitwiseOr,
        Token::Caret => Precedence::BitwiseXor,
        Token::Amp => Precedence::BitwiseAnd,
        Token::EqualEqual | Token::BangEqual => Precedence::Equality,
        Token::Less | Token::LessEqual | Token::Greater | Token::GreaterEqual => {
            Precedence::Relational
        }
        Token::LessLess | Token::GreaterGreater => Precedence::Shift,
        Token::Plus | Token::Minus => Precedence::Additive,
        Token::Star | Token::Slash | Token::Percent => Precedence::Multiplicative,

        _ => Precedence::None,
    }
}

/// Map a binary operator token to its AST operator.
pub fn binary_operator(token: &Token) -> Option<BinaryOperator> {
    let op = match token {
        Token::PipePipe => BinaryOperator::LogicalOr,
        Token::AmpAmp => BinaryOperator::LogicalAnd,
        Token::Pipe => BinaryOperator::BitwiseOr,
        Token::Caret => BinaryOperator::BitwiseXor,
        Token::Amp => BinaryOperator::BitwiseAnd,
        Token::EqualEqual => BinaryOperator::Equal,
        Token::BangEqual => BinaryOperator::NotEqual,
        Token::Less => BinaryOperator::Less,
        Token::LessEqual => BinaryOperator::LessEqual,
        Token::Greater => BinaryOperator::Greater,
        Token::GreaterEqual => BinaryOperator::GreaterEqual,
        Token::LessLess => BinaryOperator::ShiftLeft,
        Token::GreaterGreater => BinaryOperator::ShiftRight,
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Subtract,
        Token::Star => BinaryOperator::Multiply,
        Token::Slash => BinaryOperator::Divide,
        Token::Percent => BinaryOperator::Modulo,
        _ => return None,
    };
    Some(op)
}

/// Operator applied by a compound assignment token (`+=` applies `+`).
pub fn compound_operator(token: &Token) -> Option<BinaryOperator> {
    let op = match token {
        Token::PlusEqual => BinaryOperator::Add,
        Token::MinusEqual => BinaryOperator::Subtract,
        Token::StarEqual => BinaryOperator::Multiply,
        Token::SlashEqual => BinaryOperator::Divide,
        Token::PercentEqual => BinaryOperator::Modulo,
        Token::LessLessEqual => BinaryOperator::ShiftLeft,
        Token::GreaterGreaterEqual => BinaryOperator::ShiftRight,
        Token::AmpEqual => BinaryOperator::BitwiseAnd,
        Token::PipeEqual => BinaryOperator::BitwiseOr,
        Token::CaretEqual => BinaryOperator::BitwiseXor,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicative_binds_tighter() {
        assert!(get_precedence(&Token::Star) > get_precedence(&Token::Plus));
        assert!(get_precedence(&Token::Plus) > get_precedence(&Token::LessLess));
        assert!(get_precedence(&Token::AmpAmp) > get_precedence(&Token::PipePipe));
    }

    #[test]
    fn test_non_operator() {
        assert_eq!(get_precedence(&Token::Semicolon), Precedence::None);
        assert_eq!(binary_operator(&Token::Equal), None);
        assert_eq!(compound_operator(&Token::CaretEqual), Some(BinaryOperator::BitwiseXor));
    }
}
