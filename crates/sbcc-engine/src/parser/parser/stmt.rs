//! Statement parsing

use super::{recovery, ParseError, Parser};
use crate::parser::ast::{
    Block, ExpressionStatement, ForStatement, IfStatement, ReturnStatement, Statement,
    WhileStatement,
};
use crate::parser::token::Token;

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    if parser.current().is_type_keyword() {
        return super::decl::parse_local_declaration(parser);
    }

    match parser.current() {
        Token::LeftBrace => parse_block(parser).map(Statement::Block),
        Token::If => parse_if_statement(parser),
        Token::While => parse_while_statement(parser),
        Token::For => parse_for_statement(parser),
        Token::Return => parse_return_statement(parser),
        Token::Semicolon => {
            let span = parser.current_span();
            parser.advance();
            Ok(Statement::Empty(span))
        }
        _ => {
            let start_span = parser.current_span();
            let expression = super::expr::parse_expression(parser)?;
            parser.expect(Token::Semicolon)?;
            let span = parser.combine_spans(&start_span, &parser.previous_span());

            Ok(Statement::Expression(ExpressionStatement { expression, span }))
        }
    }
}

/// Parse a compound statement `{ ... }` in a fresh scope.
///
/// Statement errors inside the block are recorded and parsing resumes at the
/// next statement boundary.
pub fn parse_block(parser: &mut Parser) -> Result<Block, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    parser.push_scope();

    let mut statements = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        match parse_statement(parser) {
            Ok(stmt) => statements.push(stmt),
            Err(err) => {
                parser.record(err);
                recovery::sync_to_statement_boundary(parser);
            }
        }
    }

    let scope = parser.pop_scope();
    parser.expect(Token::RightBrace)?;
    let span = parser.combine_spans(&start_span, &parser.previous_span());

    Ok(Block {
        statements,
        scope,
        span,
    })
}

/// Parse if statement: if (condition) stmt [else stmt]
fn parse_if_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::If)?;

    parser.expect(Token::LeftParen)?;
    let condition = super::expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;

    let then_branch = Box::new(parse_statement(parser)?);

    let else_branch = if parser.check(&Token::Else) {
        parser.advance();
        Some(Box::new(parse_statement(parser)?))
    } else {
        None
    };

    let span = parser.combine_spans(&start_span, &parser.previous_span());

    Ok(Statement::If(IfStatement {
        condition,
        then_branch,
        else_branch,
        span,
    }))
}

/// Parse while statement: while (condition) stmt
fn parse_while_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::While)?;

    parser.expect(Token::LeftParen)?;
    let condition = super::expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;

    let body = Box::new(parse_statement(parser)?);
    let span = parser.combine_spans(&start_span, body.span());

    Ok(Statement::While(WhileStatement {
        condition,
        body,
        span,
    }))
}

/// Parse for statement: for (init; test; update) stmt
///
/// A declaration in the initializer is scoped to the loop.
fn parse_for_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::For)?;
    parser.expect(Token::LeftParen)?;

    parser.push_scope();
    let parts = parse_for_parts(parser);
    let scope = parser.pop_scope();
    let (init, test, update, body) = parts?;

    let span = parser.combine_spans(&start_span, body.span());

    Ok(Statement::For(ForStatement {
        init,
        test,
        update,
        body,
        scope,
        span,
    }))
}

type ForParts = (
    Option<Box<Statement>>,
    Option<crate::parser::ast::Expression>,
    Option<crate::parser::ast::Expression>,
    Box<Statement>,
);

fn parse_for_parts(parser: &mut Parser) -> Result<ForParts, ParseError> {
    let init = if parser.check(&Token::Semicolon) {
        parser.advance();
        None
    } else if parser.current().is_type_keyword() {
        // Consumes its own semicolon
        Some(Box::new(super::decl::parse_local_declaration(parser)?))
    } else {
        let start_span = parser.current_span();
        let expression = super::expr::parse_expression(parser)?;
        parser.expect(Token::Semicolon)?;
        let span = parser.combine_spans(&start_span, &parser.previous_span());
        Some(Box::new(Statement::Expression(ExpressionStatement {
            expression,
            span,
        })))
    };

    let test = if parser.check(&Token::Semicolon) {
        None
    } else {
        Some(super::expr::parse_expression(parser)?)
    };
    parser.expect(Token::Semicolon)?;

    let update = if parser.check(&Token::RightParen) {
        None
    } else {
        Some(super::expr::parse_expression(parser)?)
    };
    parser.expect(Token::RightParen)?;

    let body = Box::new(parse_statement(parser)?);
    Ok((init, test, update, body))
}

/// Parse return statement: return [expression];
fn parse_return_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Return)?;

    let value = if parser.check(&Token::Semicolon) {
        None
    } else {
        Some(super::expr::parse_expression(parser)?)
    };
    parser.expect(Token::Semicolon)?;

    let span = parser.combine_spans(&start_span, &parser.previous_span());
    Ok(Statement::Return(ReturnStatement { value, span }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{ExternalDecl, Expression};

    fn body(source: &str) -> Block {
        let program = Parser::new(source).unwrap().parse().unwrap();
        let item = program.unit.items.into_iter().last().unwrap();
        match item {
            ExternalDecl::Function(f) => f.body,
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else() {
        let block = body("int f(int x) { if (x) return 1; else return 0; }");
        match &block.statements[0] {
            Statement::If(stmt) => {
                assert!(matches!(*stmt.then_branch, Statement::Return(_)));
                assert!(stmt.else_branch.is_some());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_else_binds_inner() {
        let block = body("int f(int a, int b) { if (a) if (b) return 1; else return 2; return 3; }");
        match &block.statements[0] {
            Statement::If(outer) => {
                assert!(outer.else_branch.is_none());
                assert!(matches!(&*outer.then_branch, Statement::If(inner) if inner.else_branch.is_some()));
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_for_with_declaration_scope() {
        let block = body("int f() { int s = 0; for (int i = 0; i < 4; i++) s = s + i; return s; }");
        match &block.statements[1] {
            Statement::For(stmt) => {
                assert_eq!(stmt.scope.locals.len(), 1);
                assert!(matches!(stmt.init.as_deref(), Some(Statement::Declaration(_))));
                assert!(stmt.test.is_some());
                assert!(matches!(stmt.update, Some(Expression::Update(_))));
            }
            other => panic!("expected for, got {:?}", other),
        }
        // `i` belongs to the for scope, not the function block
        assert_eq!(block.scope.locals.len(), 1);
    }

    #[test]
    fn test_shadowing_creates_distinct_symbols() {
        let block = body("int f() { int x = 1; { int x = 2; x = 3; } return x; }");
        let outer = block.scope.locals[0];
        let inner = match &block.statements[1] {
            Statement::Block(b) => b.scope.locals[0],
            other => panic!("expected block, got {:?}", other),
        };
        assert_ne!(outer, inner);
        match &block.statements[2] {
            Statement::Return(ReturnStatement {
                value: Some(Expression::Identifier(id)),
                ..
            }) => assert_eq!(id.symbol, Some(outer)),
            other => panic!("expected return x, got {:?}", other),
        }
    }

    #[test]
    fn test_statement_error_recovery() {
        let errors = Parser::new("int f() { int x = ; x = 1 2; return x; }")
            .unwrap()
            .parse()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
