//! Expression parsing
//!
//! Precedence climbing over the table in [`super::precedence`]; assignment
//! is parsed separately as the lowest, right-associative level.

use super::precedence::{binary_operator, compound_operator, get_precedence, Precedence};
use super::{ParseError, Parser};
use crate::parser::ast::{
    AssignmentExpression, BinaryExpression, BinaryOperator, CallExpression, Expression,
    Identifier, IntLiteral, StringLiteral, UnaryExpression, UnaryOperator, UpdateExpression,
    UpdateOperator,
};
use crate::parser::token::Token;

/// Parse an expression.
pub fn parse_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    parse_assignment(parser)
}

/// Parse an assignment or compound assignment.
fn parse_assignment(parser: &mut Parser) -> Result<Expression, ParseError> {
    let left = parse_binary(parser, Precedence::LogicalOr)?;

    if get_precedence(parser.current()) != Precedence::Assignment {
        return Ok(left);
    }

    let op_token = parser.advance();
    let right = parse_assignment(parser)?;
    let span = parser.combine_spans(left.span(), right.span());

    if matches!(op_token, Token::Equal) {
        return Ok(Expression::Assignment(AssignmentExpression {
            left: Box::new(left),
            right: Box::new(right),
            span,
        }));
    }

    let Some(operator) = compound_operator(&op_token) else {
        return Err(ParseError::invalid_syntax(
            format!("unsupported assignment operator {}", op_token),
            span,
        ));
    };

    // `x += 4` / `x -= 4` become an update with that step
    if let (BinaryOperator::Add | BinaryOperator::Subtract, Expression::IntLiteral(lit)) =
        (operator, &right)
    {
        let update = if operator == BinaryOperator::Add {
            UpdateOperator::Increment
        } else {
            UpdateOperator::Decrement
        };
        return Ok(Expression::Update(UpdateExpression {
            operator: update,
            prefix: true,
            step: lit.value,
            argument: Box::new(left),
            span,
        }));
    }

    let value = Expression::Binary(BinaryExpression {
        operator,
        left: Box::new(left.clone()),
        right: Box::new(right),
        span,
    });
    Ok(Expression::Assignment(AssignmentExpression {
        left: Box::new(left),
        right: Box::new(value),
        span,
    }))
}

/// Parse a left-associative binary expression at or above `min`.
fn parse_binary(parser: &mut Parser, min: Precedence) -> Result<Expression, ParseError> {
    let mut left = parse_unary(parser)?;

    loop {
        let precedence = get_precedence(parser.current());
        if precedence == Precedence::Assignment || precedence < min {
            break;
        }
        let Some(operator) = binary_operator(parser.current()) else {
            break;
        };
        parser.advance();

        let right = parse_binary(parser, precedence.next())?;
        let span = parser.combine_spans(left.span(), right.span());
        left = Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span,
        });
    }

    Ok(left)
}

/// Parse a prefix unary expression.
fn parse_unary(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();

    let operator = match parser.current() {
        Token::Minus => Some(UnaryOperator::Negate),
        Token::Tilde => Some(UnaryOperator::BitwiseNot),
        Token::Bang => Some(UnaryOperator::LogicalNot),
        Token::Star => Some(UnaryOperator::Deref),
        Token::Amp => Some(UnaryOperator::AddressOf),
        Token::Plus => {
            parser.advance();
            return parse_unary(parser);
        }
        Token::PlusPlus | Token::MinusMinus => {
            let update = if parser.check(&Token::PlusPlus) {
                UpdateOperator::Increment
            } else {
                UpdateOperator::Decrement
            };
            parser.advance();
            let argument = parse_unary(parser)?;
            let span = parser.combine_spans(&start_span, argument.span());
            return Ok(Expression::Update(UpdateExpression {
                operator: update,
                prefix: true,
                step: 1,
                argument: Box::new(argument),
                span,
            }));
        }
        _ => None,
    };

    let Some(operator) = operator else {
        return parse_postfix(parser);
    };

    parser.advance();
    let operand = parse_unary(parser)?;
    let span = parser.combine_spans(&start_span, operand.span());
    Ok(Expression::Unary(UnaryExpression {
        operator,
        operand: Box::new(operand),
        span,
    }))
}

/// Parse calls and postfix `++`/`--`.
fn parse_postfix(parser: &mut Parser) -> Result<Expression, ParseError> {
    let mut expr = parse_primary(parser)?;

    loop {
        match parser.current() {
            Token::LeftParen => {
                parser.advance();
                let arguments = parse_arguments(parser)?;
                let span = parser.combine_spans(expr.span(), &parser.previous_span());
                expr = Expression::Call(CallExpression {
                    callee: Box::new(expr),
                    arguments,
                    span,
                });
            }
            Token::PlusPlus | Token::MinusMinus => {
                let operator = if parser.check(&Token::PlusPlus) {
                    UpdateOperator::Increment
                } else {
                    UpdateOperator::Decrement
                };
                parser.advance();
                let span = parser.combine_spans(expr.span(), &parser.previous_span());
                expr = Expression::Update(UpdateExpression {
                    operator,
                    prefix: false,
                    step: 1,
                    argument: Box::new(expr),
                    span,
                });
            }
            _ => break,
        }
    }

    Ok(expr)
}

/// Parse a call's argument list after the opening paren.
fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    let mut arguments = Vec::new();
    if parser.check(&Token::RightParen) {
        parser.advance();
        return Ok(arguments);
    }

    loop {
        arguments.push(parse_assignment(parser)?);
        if parser.check(&Token::Comma) {
            parser.advance();
            continue;
        }
        parser.expect(Token::RightParen)?;
        return Ok(arguments);
    }
}

/// Parse a primary expression (literal, identifier, grouped expression).
fn parse_primary(parser: &mut Parser) -> Result<Expression, ParseError> {
    let span = parser.current_span();

    match parser.current().clone() {
        Token::IntLiteral(value) => {
            parser.advance();
            Ok(Expression::IntLiteral(IntLiteral { value, span }))
        }
        Token::StringLiteral(first) => {
            parser.advance();
            // Adjacent literals concatenate: "ab" "cd"
            let mut value = first;
            while let Token::StringLiteral(next) = parser.current() {
                value.push_str(next);
                parser.advance();
            }
            let span = parser.combine_spans(&span, &parser.previous_span());
            Ok(Expression::StringLiteral(StringLiteral { value, span }))
        }
        Token::Identifier(name) => {
            parser.advance();
            let symbol = parser.resolve(&name);
            Ok(Expression::Identifier(Identifier { name, symbol, span }))
        }
        Token::LeftParen => {
            parser.advance();
            let inner = parse_expression(parser)?;
            parser.expect(Token::RightParen)?;
            Ok(inner)
        }
        _ => Err(parser.unexpected_token(vec![])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Expression {
        let mut parser = Parser::new(source).unwrap();
        parse_expression(&mut parser).unwrap()
    }

    fn shape(expr: &Expression) -> String {
        match expr {
            Expression::IntLiteral(lit) => lit.value.to_string(),
            Expression::StringLiteral(s) => format!("{:?}", s.value),
            Expression::Identifier(id) => id.name.clone(),
            Expression::Binary(b) => {
                format!("({:?} {} {})", b.operator, shape(&b.left), shape(&b.right))
            }
            Expression::Unary(u) => format!("({:?} {})", u.operator, shape(&u.operand)),
            Expression::Update(u) => format!(
                "({:?}{} {} {})",
                u.operator,
                if u.prefix { "Pre" } else { "Post" },
                u.step,
                shape(&u.argument)
            ),
            Expression::Assignment(a) => format!("(= {} {})", shape(&a.left), shape(&a.right)),
            Expression::Call(c) => format!(
                "(call {} [{}])",
                shape(&c.callee),
                c.arguments.iter().map(shape).collect::<Vec<_>>().join(" ")
            ),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(shape(&parse("2 + 3 * 4")), "(Add 2 (Multiply 3 4))");
        assert_eq!(shape(&parse("a - b - c")), "(Subtract (Subtract a b) c)");
        assert_eq!(
            shape(&parse("a < b == c && d || e")),
            "(LogicalOr (LogicalAnd (Equal (Less a b) c) d) e)"
        );
        assert_eq!(shape(&parse("1 << 2 + 3")), "(ShiftLeft 1 (Add 2 3))");
    }

    #[test]
    fn test_division_left_associative() {
        assert_eq!(shape(&parse("a / b / c")), "(Divide (Divide a b) c)");
    }

    #[test]
    fn test_assignment_right_associative() {
        assert_eq!(shape(&parse("a = b = 3")), "(= a (= b 3))");
    }

    #[test]
    fn test_compound_assignment_with_literal_is_update() {
        assert_eq!(shape(&parse("x += 4")), "(IncrementPre 4 x)");
        assert_eq!(shape(&parse("x -= 2")), "(DecrementPre 2 x)");
    }

    #[test]
    fn test_compound_assignment_desugars() {
        assert_eq!(shape(&parse("x += y")), "(= x (Add x y))");
        assert_eq!(shape(&parse("x *= 3")), "(= x (Multiply x 3))");
    }

    #[test]
    fn test_unary_and_postfix() {
        assert_eq!(shape(&parse("-*p")), "(Negate (Deref p))");
        assert_eq!(shape(&parse("i++")), "(IncrementPost 1 i)");
        assert_eq!(shape(&parse("--i")), "(DecrementPre 1 i)");
        assert_eq!(shape(&parse("!~x")), "(LogicalNot (BitwiseNot x))");
    }

    #[test]
    fn test_call_arguments() {
        assert_eq!(shape(&parse("f(1, g(x), y + 1)")), "(call f [1 (call g [x]) (Add y 1)])");
        assert_eq!(shape(&parse("f()")), "(call f [])");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(shape(&parse("\"ab\" \"cd\"")), "\"abcd\"");
    }

    #[test]
    fn test_missing_operand() {
        let mut parser = Parser::new("1 +").unwrap();
        assert!(parse_expression(&mut parser).is_err());
    }
}
