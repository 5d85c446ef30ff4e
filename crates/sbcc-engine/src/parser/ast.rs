//! Abstract Syntax Tree for the C subset.
//!
//! Identifiers are resolved against the [`SymbolTable`](crate::parser::SymbolTable)
//! while parsing, so every name reference carries the [`SymbolId`] it denotes.

use crate::parser::symbols::{CType, SymbolId, SymbolTable};
use crate::parser::token::Span;

// ============================================================================
// Translation unit
// ============================================================================

/// A whole source file.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub items: Vec<ExternalDecl>,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDecl {
    /// Function with a body
    Function(FunctionDef),
    /// Function prototype without a body
    Prototype(Prototype),
    /// Global variable declaration
    Global(GlobalDecl),
}

impl ExternalDecl {
    pub fn span(&self) -> &Span {
        match self {
            ExternalDecl::Function(f) => &f.span,
            ExternalDecl::Prototype(p) => &p.span,
            ExternalDecl::Global(g) => &g.span,
        }
    }
}

/// Function definition: `int f(int x) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub symbol: SymbolId,
    pub params: Vec<SymbolId>,
    pub body: Block,
    pub span: Span,
}

/// Function prototype: `int f(int x);`
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub symbol: SymbolId,
    pub params: Vec<SymbolId>,
    pub span: Span,
}

/// Global variable: `int counter = 3;`
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDecl {
    pub name: String,
    pub symbol: SymbolId,
    pub initializer: Option<Expression>,
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

/// Locals declared directly in a block, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scope {
    pub locals: Vec<SymbolId>,
}

/// Compound statement `{ ... }` with its scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub scope: Scope,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Expression statement: `f(x);`
    Expression(ExpressionStatement),

    /// Local declaration: `int x = 1;`
    Declaration(Declaration),

    /// Return statement
    Return(ReturnStatement),

    /// If statement
    If(IfStatement),

    /// While loop
    While(WhileStatement),

    /// C-style for loop
    For(ForStatement),

    /// Nested compound statement
    Block(Block),

    /// Empty statement (;)
    Empty(Span),
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Expression(s) => &s.span,
            Statement::Declaration(s) => &s.span,
            Statement::Return(s) => &s.span,
            Statement::If(s) => &s.span,
            Statement::While(s) => &s.span,
            Statement::For(s) => &s.span,
            Statement::Block(s) => &s.span,
            Statement::Empty(span) => span,
        }
    }

    /// Whether this is an if, while or for statement
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Statement::If(_) | Statement::While(_) | Statement::For(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub symbol: SymbolId,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

/// `for (init; test; update) body`
///
/// The scope holds a declaration made in the initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub init: Option<Box<Statement>>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Box<Statement>,
    pub scope: Scope,
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    IntLiteral(IntLiteral),
    StringLiteral(StringLiteral),
    Identifier(Identifier),
    Binary(BinaryExpression),
    Unary(UnaryExpression),
    Update(UpdateExpression),
    Assignment(AssignmentExpression),
    Call(CallExpression),
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::IntLiteral(e) => &e.span,
            Expression::StringLiteral(e) => &e.span,
            Expression::Identifier(e) => &e.span,
            Expression::Binary(e) => &e.span,
            Expression::Unary(e) => &e.span,
            Expression::Update(e) => &e.span,
            Expression::Assignment(e) => &e.span,
            Expression::Call(e) => &e.span,
        }
    }

    /// Best-effort static type; `None` when unknown.
    ///
    /// Integer operands combine the C way: the result is unsigned when
    /// either side is, except for shifts, which take the left operand's type.
    pub fn static_type(&self, symbols: &SymbolTable) -> Option<CType> {
        match self {
            Expression::IntLiteral(_) => Some(CType::int()),
            Expression::StringLiteral(_) => Some(CType::char_ptr()),
            Expression::Identifier(id) => Some(symbols.get(id.symbol?)?.ty.clone()),
            Expression::Binary(b) => {
                if b.operator.is_comparison() || b.operator.is_logical() {
                    return Some(CType::int());
                }
                let left = b.left.static_type(symbols);
                if matches!(b.operator, BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight) {
                    return left;
                }
                let right = b.right.static_type(symbols);
                match (left, right) {
                    (Some(l), _) if l.is_ptr() => Some(l),
                    (_, Some(r)) if r.is_ptr() => Some(r),
                    (Some(l), Some(r)) if r.is_unsigned() && !l.is_unsigned() => Some(r),
                    (l, r) => l.or(r),
                }
            }
            Expression::Unary(u) => match u.operator {
                UnaryOperator::Deref => u.operand.static_type(symbols)?.pointee().cloned(),
                UnaryOperator::AddressOf => {
                    Some(CType::Pointer(Box::new(u.operand.static_type(symbols)?)))
                }
                UnaryOperator::LogicalNot => Some(CType::int()),
                UnaryOperator::Negate | UnaryOperator::BitwiseNot => u.operand.static_type(symbols),
            },
            Expression::Update(u) => u.argument.static_type(symbols),
            Expression::Assignment(a) => a.left.static_type(symbols),
            Expression::Call(call) => {
                let Expression::Identifier(callee) = call.callee.as_ref() else {
                    return None;
                };
                let symbol = symbols.get(callee.symbol?)?;
                symbol.ty.as_function().map(|f| (*f.ret).clone())
            }
        }
    }

    /// Value of an integer literal, including a negated one (`-5`).
    pub fn as_int_literal(&self) -> Option<i64> {
        match self {
            Expression::IntLiteral(lit) => Some(lit.value),
            Expression::Unary(UnaryExpression {
                operator: UnaryOperator::Negate,
                operand,
                ..
            }) => match operand.as_ref() {
                Expression::IntLiteral(lit) => Some(lit.value.wrapping_neg()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether this expression denotes a storage location.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            Expression::Identifier(_)
                | Expression::Unary(UnaryExpression {
                    operator: UnaryOperator::Deref,
                    ..
                })
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub value: i64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

/// Name reference; `symbol` is `None` when the name is undeclared.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub symbol: Option<SymbolId>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    ShiftLeft,
    ShiftRight,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::Greater
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterEqual
                | BinaryOperator::Equal
                | BinaryOperator::NotEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `-e`
    Negate,
    /// `~e`
    BitwiseNot,
    /// `!e`
    LogicalNot,
    /// `*e`
    Deref,
    /// `&e`
    AddressOf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

/// `++x`, `x--`, and `x += 4` with a literal step.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub operator: UpdateOperator,
    pub prefix: bool,
    pub step: i64,
    pub argument: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: Span,
}
