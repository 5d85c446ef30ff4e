//! Error recovery strategies for the parser.
//!
//! When the parser encounters an error, it uses these strategies to
//! resynchronize and continue parsing to find more errors.

use super::Parser;
use crate::parser::token::Token;

/// Synchronize to the next statement boundary.
///
/// Skips tokens until a `;` (consumed) or a `}` / statement keyword (left in place).
pub fn sync_to_statement_boundary(parser: &mut Parser) {
    while !parser.at_eof() {
        match parser.current() {
            Token::If | Token::While | Token::For | Token::Return | Token::LeftBrace => return,
            Token::Semicolon => {
                parser.advance();
                return;
            }
            Token::RightBrace => return,
            _ => {
                parser.advance();
            }
        }
    }
}

/// Synchronize to the next top-level declaration.
///
/// Skips a whole brace-balanced region so a broken function body is not
/// re-parsed as a sequence of declarations.
pub fn sync_to_declaration_boundary(parser: &mut Parser) {
    let mut depth = 0usize;
    while !parser.at_eof() {
        match parser.current() {
            Token::LeftBrace => depth += 1,
            Token::RightBrace => {
                parser.advance();
                if depth <= 1 {
                    return;
                }
                depth -= 1;
                continue;
            }
            Token::Semicolon if depth == 0 => {
                parser.advance();
                return;
            }
            _ => {}
        }
        parser.advance();
    }
}
