//! Declaration parsing: type specifiers, functions, prototypes and globals.

use super::{ParseError, Parser};
use crate::parser::ast::{Declaration, ExternalDecl, FunctionDef, GlobalDecl, Prototype, Statement};
use crate::parser::symbols::{CType, FunctionType, IntKind, Symbol, SymbolId, SymbolKind};
use crate::parser::token::{Span, Token};

/// Parse a type: specifier keywords followed by any number of `*`.
pub fn parse_type(parser: &mut Parser) -> Result<CType, ParseError> {
    let start = parser.current_span();
    let mut kind: Option<IntKind> = None;
    let mut unsigned = false;
    let mut signed = false;
    let mut void = false;
    let mut seen_any = false;

    while parser.current().is_type_keyword() {
        seen_any = true;
        match parser.advance() {
            Token::Const => {}
            Token::Unsigned => unsigned = true,
            Token::Signed => signed = true,
            Token::Void => void = true,
            Token::Char => kind = Some(merge_kind(kind, IntKind::Char, start)?),
            Token::Short => kind = Some(merge_kind(kind, IntKind::Short, start)?),
            Token::Long => kind = Some(merge_kind(kind, IntKind::Long, start)?),
            Token::Int => {
                // `short int` and `long int` keep their width
                if kind.is_none() {
                    kind = Some(IntKind::Int);
                }
            }
            _ => {}
        }
    }

    if !seen_any {
        return Err(ParseError::invalid_type(
            format!("expected a type, found {}", parser.current()),
            parser.current_span(),
        ));
    }
    if unsigned && signed {
        return Err(ParseError::invalid_type(
            "both 'signed' and 'unsigned' given",
            start,
        ));
    }

    let mut ty = if void {
        if kind.is_some() || unsigned || signed {
            return Err(ParseError::invalid_type("'void' combined with an integer type", start));
        }
        CType::Void
    } else {
        CType::Integer {
            kind: kind.unwrap_or(IntKind::Int),
            unsigned,
        }
    };

    while parser.check(&Token::Star) {
        parser.advance();
        // `char * const p` is accepted and the qualifier ignored
        while parser.check(&Token::Const) {
            parser.advance();
        }
        ty = CType::Pointer(Box::new(ty));
    }

    Ok(ty)
}

fn merge_kind(current: Option<IntKind>, next: IntKind, span: Span) -> Result<IntKind, ParseError> {
    match current {
        None | Some(IntKind::Int) => Ok(next),
        // `long long` is still 64 bits
        Some(IntKind::Long) if next == IntKind::Long => Ok(IntKind::Long),
        Some(_) => Err(ParseError::invalid_type("conflicting type specifiers", span)),
    }
}

/// Parse one top-level declaration.
pub fn parse_external_decl(parser: &mut Parser) -> Result<ExternalDecl, ParseError> {
    let start_span = parser.current_span();
    let ty = parse_type(parser)?;
    let name = parser.expect_identifier()?;

    if parser.check(&Token::LeftParen) {
        return parse_function(parser, ty, name, start_span);
    }

    parse_global(parser, ty, name, start_span)
}

fn parse_global(
    parser: &mut Parser,
    ty: CType,
    name: String,
    start_span: Span,
) -> Result<ExternalDecl, ParseError> {
    if ty.is_void() {
        return Err(ParseError::invalid_type(
            format!("variable '{}' declared void", name),
            start_span,
        ));
    }

    let initializer = if parser.check(&Token::Equal) {
        parser.advance();
        Some(super::expr::parse_expression(parser)?)
    } else {
        None
    };

    let value = match &initializer {
        None => 0,
        Some(init) => init.as_int_literal().ok_or_else(|| {
            ParseError::invalid_syntax(
                format!("initializer of global '{}' must be an integer constant", name),
                *init.span(),
            )
        })?,
    };

    parser.expect(Token::Semicolon)?;

    let mut symbol = Symbol::new(name.clone(), ty, SymbolKind::Variable);
    symbol.value = value;
    let symbol = parser.symbols_mut().push(symbol);

    let span = parser.combine_spans(&start_span, &parser.previous_span());
    Ok(ExternalDecl::Global(GlobalDecl {
        name,
        symbol,
        initializer,
        span,
    }))
}

fn parse_function(
    parser: &mut Parser,
    ret: CType,
    name: String,
    start_span: Span,
) -> Result<ExternalDecl, ParseError> {
    parser.expect(Token::LeftParen)?;
    parser.push_scope();
    let params = match parse_parameters(parser) {
        Ok(params) => params,
        Err(err) => {
            parser.pop_scope();
            return Err(err);
        }
    };

    let fn_ty = CType::Function(FunctionType {
        params: params.clone(),
        ret: Box::new(ret),
    });

    // A definition after a prototype reuses the prototype's symbol
    let symbol = match parser.existing_function(&name) {
        Some(id) => {
            if let Some(existing) = parser.symbols_mut().get_mut(id) {
                existing.ty = fn_ty;
            }
            id
        }
        None => parser
            .symbols_mut()
            .push(Symbol::new(name.clone(), fn_ty, SymbolKind::Function)),
    };

    if parser.check(&Token::Semicolon) {
        parser.advance();
        parser.pop_scope();
        let span = parser.combine_spans(&start_span, &parser.previous_span());
        return Ok(ExternalDecl::Prototype(Prototype {
            name,
            symbol,
            params,
            span,
        }));
    }

    if !parser.check(&Token::LeftBrace) {
        parser.pop_scope();
        return Err(parser.unexpected_token(vec![Token::Semicolon, Token::LeftBrace]));
    }

    let body = super::stmt::parse_block(parser);
    parser.pop_scope();
    let body = body?;

    let span = parser.combine_spans(&start_span, &body.span);
    Ok(ExternalDecl::Function(FunctionDef {
        name,
        symbol,
        params,
        body,
        span,
    }))
}

/// Parse `(int a, char *b)` after the opening paren, declaring each parameter.
fn parse_parameters(parser: &mut Parser) -> Result<Vec<SymbolId>, ParseError> {
    let mut params = Vec::new();

    if parser.check(&Token::RightParen) {
        parser.advance();
        return Ok(params);
    }
    if parser.check(&Token::Void) && matches!(parser.peek(), Some(Token::RightParen)) {
        parser.advance();
        parser.advance();
        return Ok(params);
    }

    loop {
        let ty = parse_type(parser)?;
        let name = parser.expect_identifier()?;
        let id = parser.declare_local(Symbol::new(name, ty, SymbolKind::Parameter));
        params.push(id);

        if parser.check(&Token::Comma) {
            parser.advance();
            continue;
        }
        parser.expect(Token::RightParen)?;
        break;
    }

    Ok(params)
}

/// Parse a local declaration statement: `int x = e;`
pub fn parse_local_declaration(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    let ty = parse_type(parser)?;
    let name_span = parser.current_span();
    let name = parser.expect_identifier()?;

    if ty.is_void() {
        return Err(ParseError::invalid_type(
            format!("variable '{}' declared void", name),
            name_span,
        ));
    }

    // The initializer is parsed before the name is in scope: `int x = x;`
    // refers to an outer `x`.
    let initializer = if parser.check(&Token::Equal) {
        parser.advance();
        Some(super::expr::parse_expression(parser)?)
    } else {
        None
    };
    parser.expect(Token::Semicolon)?;

    let mut symbol = Symbol::new(name.clone(), ty, SymbolKind::Local);
    if let Some(value) = initializer.as_ref().and_then(|e| e.as_int_literal()) {
        symbol.value = value;
    }
    let symbol = parser.declare_local(symbol);

    let span = parser.combine_spans(&start_span, &parser.previous_span());
    Ok(Statement::Declaration(Declaration {
        name,
        symbol,
        initializer,
        span,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ty(source: &str) -> CType {
        let mut parser = Parser::new(source).unwrap();
        parse_type(&mut parser).unwrap()
    }

    #[test]
    fn test_parse_scalar_types() {
        assert_eq!(parse_ty("int"), CType::int());
        assert_eq!(
            parse_ty("unsigned long"),
            CType::Integer {
                kind: IntKind::Long,
                unsigned: true
            }
        );
        assert_eq!(
            parse_ty("short int"),
            CType::Integer {
                kind: IntKind::Short,
                unsigned: false
            }
        );
    }

    #[test]
    fn test_parse_pointer_types() {
        assert_eq!(parse_ty("const char *"), CType::char_ptr());
        assert!(parse_ty("int **").pointee().unwrap().is_ptr());
    }

    #[test]
    fn test_conflicting_specifiers() {
        let mut parser = Parser::new("char long").unwrap();
        assert!(parse_type(&mut parser).is_err());
        let mut parser = Parser::new("signed unsigned").unwrap();
        assert!(parse_type(&mut parser).is_err());
    }

    #[test]
    fn test_prototype_then_definition_share_symbol() {
        let program = Parser::new("int f(int a); int f(int a) { return a; }")
            .unwrap()
            .parse()
            .unwrap();
        let ids: Vec<SymbolId> = program
            .unit
            .items
            .iter()
            .map(|item| match item {
                ExternalDecl::Prototype(p) => p.symbol,
                ExternalDecl::Function(f) => f.symbol,
                ExternalDecl::Global(g) => g.symbol,
            })
            .collect();
        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn test_global_initializer_value() {
        let program = Parser::new("int g = -7;").unwrap().parse().unwrap();
        let id = program.symbols.lookup_global("g").unwrap();
        assert_eq!(program.symbols.get(id).unwrap().value, -7);
    }

    #[test]
    fn test_global_initializer_must_be_constant() {
        assert!(Parser::new("int a; int g = a;").unwrap().parse().is_err());
    }

    #[test]
    fn test_void_parameter_list() {
        let program = Parser::new("int main(void) { return 0; }")
            .unwrap()
            .parse()
            .unwrap();
        let main = program.functions().next().unwrap();
        assert!(main.params.is_empty());
    }
}
