//! Checker - validates names and types over the AST
//!
//! The checker walks every function body once, using the symbol table the
//! parser built. It never mutates the program.

use super::error::CheckError;
use super::MAX_ARGS;
use crate::parser::ast::*;
use crate::parser::symbols::{CType, SymbolId, SymbolKind, SymbolTable};
use crate::parser::token::Span;
use crate::parser::Program;
use rustc_hash::FxHashSet;

/// Semantic checker over a parsed [`Program`].
pub struct Checker<'a> {
    symbols: &'a SymbolTable,
    errors: Vec<CheckError>,
    /// Name and return type of the function being checked
    function: Option<(String, CType)>,
}

impl<'a> Checker<'a> {
    /// Check a whole program, collecting every error.
    pub fn check(program: &Program) -> Result<(), Vec<CheckError>> {
        let mut checker = Checker {
            symbols: &program.symbols,
            errors: Vec::new(),
            function: None,
        };
        checker.check_unit(&program.unit);

        if checker.errors.is_empty() {
            Ok(())
        } else {
            log::debug!("checker found {} errors", checker.errors.len());
            Err(checker.errors)
        }
    }

    fn check_unit(&mut self, unit: &TranslationUnit) {
        let mut defined: FxHashSet<&str> = FxHashSet::default();
        let mut globals: FxHashSet<&str> = FxHashSet::default();

        for item in &unit.items {
            match item {
                ExternalDecl::Global(global) => {
                    if !globals.insert(&global.name) {
                        self.errors.push(CheckError::Redeclaration {
                            name: global.name.clone(),
                            span: global.span,
                        });
                    }
                }
                ExternalDecl::Prototype(proto) => {
                    self.check_signature(&proto.name, proto.symbol, &proto.params, proto.span);
                }
                ExternalDecl::Function(func) => {
                    if !defined.insert(&func.name) {
                        self.errors.push(CheckError::DuplicateFunction {
                            name: func.name.clone(),
                            span: func.span,
                        });
                    }
                    self.check_signature(&func.name, func.symbol, &func.params, func.span);
                    self.check_function(func);
                }
            }
        }
    }

    fn check_signature(&mut self, name: &str, symbol: SymbolId, params: &[SymbolId], span: Span) {
        if params.len() > MAX_ARGS {
            self.errors.push(CheckError::TooManyParameters {
                name: name.to_string(),
                count: params.len(),
                span,
            });
        }

        let final_arity = self
            .symbols
            .get(symbol)
            .and_then(|s| s.ty.as_function())
            .map(|f| f.params.len());
        if let Some(expected) = final_arity {
            if expected != params.len() {
                self.errors.push(CheckError::ConflictingDeclaration {
                    name: name.to_string(),
                    expected,
                    actual: params.len(),
                    span,
                });
            }
        }
    }

    fn check_function(&mut self, func: &FunctionDef) {
        let ret = self
            .symbols
            .get(func.symbol)
            .and_then(|s| s.ty.as_function())
            .map(|f| (*f.ret).clone())
            .unwrap_or_else(CType::int);
        self.function = Some((func.name.clone(), ret));

        // Parameters and the body's outermost locals share one C scope
        let mut seen = FxHashSet::default();
        let params = Scope {
            locals: func.params.clone(),
        };
        self.check_scope(&params, &mut seen, func.span);
        self.check_scope(&func.body.scope, &mut seen, func.body.span);
        for stmt in &func.body.statements {
            self.check_statement(stmt);
        }

        self.function = None;
    }

    fn check_scope(&mut self, scope: &Scope, seen: &mut FxHashSet<String>, span: Span) {
        for &local in &scope.locals {
            let Some(sym) = self.symbols.get(local) else {
                continue;
            };
            if !seen.insert(sym.name.clone()) {
                self.errors.push(CheckError::Redeclaration {
                    name: sym.name.clone(),
                    span,
                });
            }
        }
    }

    fn check_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Expression(s) => self.check_expression(&s.expression),
            Statement::Declaration(decl) => {
                if let Some(init) = &decl.initializer {
                    self.check_expression(init);
                }
            }
            Statement::Return(ret) => self.check_return(ret),
            Statement::If(s) => {
                self.check_expression(&s.condition);
                self.check_statement(&s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.check_statement(else_branch);
                }
            }
            Statement::While(s) => {
                self.check_expression(&s.condition);
                self.check_statement(&s.body);
            }
            Statement::For(s) => {
                let mut seen = FxHashSet::default();
                self.check_scope(&s.scope, &mut seen, s.span);
                if let Some(init) = &s.init {
                    self.check_statement(init);
                }
                if let Some(test) = &s.test {
                    self.check_expression(test);
                }
                if let Some(update) = &s.update {
                    self.check_expression(update);
                }
                self.check_statement(&s.body);
            }
            Statement::Block(block) => {
                let mut seen = FxHashSet::default();
                self.check_scope(&block.scope, &mut seen, block.span);
                for stmt in &block.statements {
                    self.check_statement(stmt);
                }
            }
            Statement::Empty(_) => {}
        }
    }

    fn check_return(&mut self, ret: &ReturnStatement) {
        if let Some(value) = &ret.value {
            self.check_expression(value);
        }
        let Some((name, ty)) = &self.function else {
            return;
        };
        match (&ret.value, ty.is_void()) {
            (Some(_), true) => self.errors.push(CheckError::ReturnValueInVoid {
                function: name.clone(),
                span: ret.span,
            }),
            (None, false) => self.errors.push(CheckError::MissingReturnValue {
                function: name.clone(),
                span: ret.span,
            }),
            _ => {}
        }
    }

    fn check_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::IntLiteral(_) | Expression::StringLiteral(_) => {}
            Expression::Identifier(id) => match id.symbol.and_then(|s| self.symbols.get(s)) {
                None => self.errors.push(CheckError::UndefinedIdentifier {
                    name: id.name.clone(),
                    span: id.span,
                }),
                Some(sym) if sym.kind == SymbolKind::Function => {
                    self.errors.push(CheckError::FunctionAsValue {
                        name: id.name.clone(),
                        span: id.span,
                    })
                }
                Some(_) => {}
            },
            Expression::Binary(b) => {
                self.check_expression(&b.left);
                self.check_expression(&b.right);
            }
            Expression::Unary(u) => {
                self.check_expression(&u.operand);
                match u.operator {
                    UnaryOperator::Deref => {
                        if let Some(ty) = self.type_of(&u.operand) {
                            if !ty.is_ptr() {
                                self.errors.push(CheckError::DerefNonPointer {
                                    ty: ty.to_string(),
                                    span: u.span,
                                });
                            }
                        }
                    }
                    UnaryOperator::AddressOf => {
                        if !u.operand.is_lvalue() {
                            self.errors.push(CheckError::InvalidAddressOf { span: u.span });
                        }
                    }
                    _ => {}
                }
            }
            Expression::Update(u) => {
                self.check_expression(&u.argument);
                if !u.argument.is_lvalue() {
                    self.errors
                        .push(CheckError::InvalidAssignmentTarget { span: u.span });
                }
            }
            Expression::Assignment(a) => {
                self.check_expression(&a.right);
                self.check_expression(&a.left);
                if !a.left.is_lvalue() {
                    self.errors
                        .push(CheckError::InvalidAssignmentTarget { span: a.span });
                }
            }
            Expression::Call(call) => self.check_call(call),
        }
    }

    fn check_call(&mut self, call: &CallExpression) {
        for arg in &call.arguments {
            self.check_expression(arg);
        }

        let Expression::Identifier(callee) = call.callee.as_ref() else {
            self.errors.push(CheckError::NotAFunction {
                name: "<expression>".to_string(),
                span: *call.callee.span(),
            });
            return;
        };

        let Some(sym) = callee.symbol.and_then(|s| self.symbols.get(s)) else {
            self.errors.push(CheckError::UndeclaredFunction {
                name: callee.name.clone(),
                span: callee.span,
            });
            return;
        };

        let Some(func) = sym.ty.as_function().filter(|_| sym.kind == SymbolKind::Function)
        else {
            self.errors.push(CheckError::NotAFunction {
                name: callee.name.clone(),
                span: callee.span,
            });
            return;
        };

        if call.arguments.len() > MAX_ARGS {
            self.errors.push(CheckError::TooManyArguments {
                name: callee.name.clone(),
                count: call.arguments.len(),
                span: call.span,
            });
        } else if call.arguments.len() != func.params.len() {
            self.errors.push(CheckError::ArgumentCountMismatch {
                name: callee.name.clone(),
                expected: func.params.len(),
                actual: call.arguments.len(),
                span: call.span,
            });
        }
    }

    fn type_of(&self, expr: &Expression) -> Option<CType> {
        expr.static_type(self.symbols)
    }
}
