//! Expression Lowering
//!
//! Converts AST expressions to IR instructions, returning the operand that
//! holds each expression's value.

use super::Lowerer;
use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{ArithOp, CmpCode, IrInstr, Local, Operand};
use crate::parser::ast::{
    AssignmentExpression, BinaryExpression, BinaryOperator, CallExpression, Expression,
    Identifier, UnaryExpression, UnaryOperator, UpdateExpression, UpdateOperator,
};
use crate::parser::{CType, Symbol, SymbolKind};

/// Comparison code of a comparison operator
fn comparison(op: BinaryOperator) -> Option<CmpCode> {
    let cmp = match op {
        BinaryOperator::Less => CmpCode::Lt,
        BinaryOperator::Greater => CmpCode::Mt,
        BinaryOperator::LessEqual => CmpCode::LtEq,
        BinaryOperator::GreaterEqual => CmpCode::MtEq,
        BinaryOperator::Equal => CmpCode::Eq,
        BinaryOperator::NotEqual => CmpCode::Neq,
        _ => return None,
    };
    Some(cmp)
}

/// Arithmetic opcode of an arithmetic operator
fn arithmetic(op: BinaryOperator, unsigned: bool) -> Option<ArithOp> {
    let op = match op {
        BinaryOperator::Add => ArithOp::Add,
        BinaryOperator::Subtract => ArithOp::Sub,
        BinaryOperator::Multiply => ArithOp::Mul,
        BinaryOperator::Divide => ArithOp::Div,
        BinaryOperator::Modulo => ArithOp::Mod,
        BinaryOperator::ShiftLeft => ArithOp::Sll,
        BinaryOperator::ShiftRight if unsigned => ArithOp::Slr,
        BinaryOperator::ShiftRight => ArithOp::Asr,
        BinaryOperator::BitwiseAnd => ArithOp::And,
        BinaryOperator::BitwiseOr => ArithOp::Orr,
        BinaryOperator::BitwiseXor => ArithOp::Xor,
        _ => return None,
    };
    Some(op)
}

impl<'a> Lowerer<'a> {
    /// Lower an expression, returning the operand holding its value
    pub(super) fn lower_expr(&mut self, expr: &Expression) -> CompileResult<Operand> {
        match expr {
            Expression::IntLiteral(lit) => Ok(Operand::Literal(lit.value)),
            Expression::StringLiteral(s) => self.lower_string(&s.value),
            Expression::Identifier(id) => self.lower_identifier(id),
            Expression::Binary(b) => self.lower_binary(b),
            Expression::Unary(u) => self.lower_unary(u),
            Expression::Update(u) => self.lower_update(u),
            Expression::Assignment(a) => self.lower_assignment(a),
            Expression::Call(call) => self.lower_call(call),
        }
    }

    fn symbol_of(&self, id: &Identifier) -> CompileResult<&Symbol> {
        id.symbol
            .and_then(|s| self.symbols.get(s))
            .ok_or_else(|| self.unknown(id.name.clone()))
    }

    /// Globals read through `@name`; locals and parameters by slot name
    fn lower_identifier(&mut self, id: &Identifier) -> CompileResult<Operand> {
        let symbol = self.symbol_of(id)?;
        match symbol.kind {
            SymbolKind::Variable => Ok(Operand::global(&symbol.name)),
            SymbolKind::StringLiteral => Ok(Operand::label(&symbol.name)),
            SymbolKind::Local | SymbolKind::Parameter => {
                let symbol = id.symbol.ok_or_else(|| self.unknown(id.name.clone()))?;
                Ok(Operand::var(self.local_name(symbol)?))
            }
            SymbolKind::Function => Err(self.unknown(id.name.clone())),
        }
    }

    /// Each literal becomes a `str.N` data symbol; its address is the value
    fn lower_string(&mut self, value: &str) -> CompileResult<Operand> {
        let index = self
            .symbols
            .iter()
            .filter(|(_, s)| s.kind == SymbolKind::StringLiteral)
            .count();
        let name = format!("str.{}", index);

        let mut symbol = Symbol::new(name.clone(), CType::char_ptr(), SymbolKind::StringLiteral);
        symbol.literal = Some(value.to_string());
        self.symbols.push(symbol);

        let dest = self.new_temp();
        self.emit(IrInstr::GetElementPtr {
            dest: dest.clone(),
            src: Operand::Label(name),
        })?;
        Ok(dest.into())
    }

    /// Whether an expression has an unsigned integer type
    fn is_unsigned(&self, expr: &Expression) -> bool {
        expr.static_type(self.symbols).is_some_and(|ty| ty.is_unsigned())
    }

    fn lower_binary(&mut self, b: &BinaryExpression) -> CompileResult<Operand> {
        if b.operator.is_logical() {
            return self.lower_logical(b);
        }

        let left = self.lower_expr(&b.left)?;
        let right = self.lower_expr(&b.right)?;
        let dest = self.new_temp();

        if let Some(cmp) = comparison(b.operator) {
            self.emit(IrInstr::Compare {
                dest: dest.clone(),
                cmp,
                op1: left,
                op2: right,
            })?;
            return Ok(dest.into());
        }

        let unsigned = b.operator == BinaryOperator::ShiftRight && self.is_unsigned(&b.left);
        let op = arithmetic(b.operator, unsigned).ok_or_else(|| {
            CompileError::UnsupportedOpcode {
                opcode: format!("{:?}", b.operator),
            }
        })?;
        self.emit(IrInstr::Arithmetic {
            dest: dest.clone(),
            op,
            src1: left,
            src2: right,
        })?;
        Ok(dest.into())
    }

    /// Both sides are evaluated and normalized to booleans; no short circuit
    fn lower_logical(&mut self, b: &BinaryExpression) -> CompileResult<Operand> {
        let left = self.lower_expr(&b.left)?;
        let left = self.normalize(left)?;
        let right = self.lower_expr(&b.right)?;
        let right = self.normalize(right)?;

        let op = if b.operator == BinaryOperator::LogicalAnd {
            ArithOp::And
        } else {
            ArithOp::Orr
        };
        let dest = self.new_temp();
        self.emit(IrInstr::Arithmetic {
            dest: dest.clone(),
            op,
            src1: left,
            src2: right,
        })?;
        Ok(dest.into())
    }

    /// `CMP NEQ value , #0`
    fn normalize(&mut self, value: Operand) -> CompileResult<Operand> {
        let dest = self.new_temp();
        self.emit(IrInstr::Compare {
            dest: dest.clone(),
            cmp: CmpCode::Neq,
            op1: value,
            op2: Operand::Literal(0),
        })?;
        Ok(dest.into())
    }

    fn lower_unary(&mut self, u: &UnaryExpression) -> CompileResult<Operand> {
        let build: fn(Local, Operand) -> IrInstr = match u.operator {
            UnaryOperator::AddressOf => return self.lower_address_of(&u.operand),
            UnaryOperator::Negate => |dest, operand| IrInstr::Arithmetic {
                dest,
                op: ArithOp::Sub,
                src1: Operand::Literal(0),
                src2: operand,
            },
            UnaryOperator::BitwiseNot => |dest, operand| IrInstr::Arithmetic {
                dest,
                op: ArithOp::Xor,
                src1: operand,
                src2: Operand::Literal(-1),
            },
            UnaryOperator::LogicalNot => |dest, operand| IrInstr::Compare {
                dest,
                cmp: CmpCode::Eq,
                op1: operand,
                op2: Operand::Literal(0),
            },
            UnaryOperator::Deref => |dest, addr| IrInstr::Load { dest, addr },
        };

        let operand = self.lower_expr(&u.operand)?;
        let dest = self.new_temp();
        self.emit(build(dest.clone(), operand))?;
        Ok(dest.into())
    }

    /// `&x` takes the slot address, `&g` the data label, `&*p` is `p`
    fn lower_address_of(&mut self, operand: &Expression) -> CompileResult<Operand> {
        let src = match operand {
            Expression::Identifier(id) => match self.lower_identifier(id)? {
                Operand::Global(name) => Operand::Label(name),
                other => other,
            },
            Expression::Unary(UnaryExpression {
                operator: UnaryOperator::Deref,
                operand,
                ..
            }) => return self.lower_expr(operand),
            other => return Err(self.unknown(format!("&{:?}", other))),
        };

        let dest = self.new_temp();
        self.emit(IrInstr::GetElementPtr {
            dest: dest.clone(),
            src,
        })?;
        Ok(dest.into())
    }

    /// Increment or decrement in place; the updated value is the result
    fn lower_update(&mut self, u: &UpdateExpression) -> CompileResult<Operand> {
        let op = match u.operator {
            UpdateOperator::Increment => ArithOp::Add,
            UpdateOperator::Decrement => ArithOp::Sub,
        };
        let step = Operand::Literal(u.step);

        match u.argument.as_ref() {
            Expression::Unary(UnaryExpression {
                operator: UnaryOperator::Deref,
                operand,
                ..
            }) => {
                let addr = self.lower_expr(operand)?;
                let value = self.new_temp();
                self.emit(IrInstr::Load {
                    dest: value.clone(),
                    addr: addr.clone(),
                })?;
                let dest = self.new_temp();
                self.emit(IrInstr::Arithmetic {
                    dest: dest.clone(),
                    op,
                    src1: value.into(),
                    src2: step,
                })?;
                self.emit(IrInstr::Store {
                    src: dest.clone().into(),
                    addr,
                })?;
                Ok(dest.into())
            }
            Expression::Identifier(id) => match self.lower_identifier(id)? {
                Operand::Local(local) => {
                    self.emit(IrInstr::Arithmetic {
                        dest: local.clone(),
                        op,
                        src1: local.clone().into(),
                        src2: step,
                    })?;
                    Ok(local.into())
                }
                Operand::Global(name) => {
                    let dest = self.new_temp();
                    self.emit(IrInstr::Arithmetic {
                        dest: dest.clone(),
                        op,
                        src1: Operand::Global(name.clone()),
                        src2: step,
                    })?;
                    self.emit(IrInstr::Store {
                        src: dest.clone().into(),
                        addr: Operand::Label(name),
                    })?;
                    Ok(dest.into())
                }
                other => Err(self.unknown(other.to_string())),
            },
            other => Err(self.unknown(format!("{:?}", other))),
        }
    }

    /// Right-hand side first, then the target
    fn lower_assignment(&mut self, a: &AssignmentExpression) -> CompileResult<Operand> {
        let value = self.lower_expr(&a.right)?;

        match a.left.as_ref() {
            Expression::Identifier(id) => match self.lower_identifier(id)? {
                Operand::Local(dest) => {
                    self.emit(IrInstr::Move {
                        dest,
                        value: value.clone(),
                    })?;
                }
                Operand::Global(name) => {
                    self.emit(IrInstr::Store {
                        src: value.clone(),
                        addr: Operand::Label(name),
                    })?;
                }
                other => return Err(self.unknown(other.to_string())),
            },
            Expression::Unary(UnaryExpression {
                operator: UnaryOperator::Deref,
                operand,
                ..
            }) => {
                let addr = self.lower_expr(operand)?;
                self.emit(IrInstr::Store {
                    src: value.clone(),
                    addr,
                })?;
            }
            other => return Err(self.unknown(format!("{:?}", other))),
        }

        Ok(value)
    }

    /// Arguments left to right, then the call into a fresh temporary
    fn lower_call(&mut self, call: &CallExpression) -> CompileResult<Operand> {
        let Expression::Identifier(callee) = call.callee.as_ref() else {
            return Err(self.unknown(format!("{:?}", call.callee)));
        };

        let mut args = Vec::with_capacity(call.arguments.len());
        for arg in &call.arguments {
            args.push(self.lower_expr(arg)?);
        }

        let dest: Local = self.new_temp();
        self.emit(IrInstr::Call {
            dest: dest.clone(),
            func: callee.name.clone(),
            args,
        })?;
        Ok(dest.into())
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::ir::{IrFunction, IrModule, PrettyPrint};
    use crate::compiler::lower::lower_program;
    use crate::parser::{Parser, SymbolKind};

    fn lower(source: &str) -> IrModule {
        let program = Parser::new(source).unwrap().parse().unwrap();
        lower_program(&program).unwrap()
    }

    fn body(source: &str) -> String {
        let module = lower(source);
        let func: &IrFunction = module.functions.last().unwrap();
        func.pretty_print()
    }

    #[test]
    fn test_binary_left_to_right() {
        let text = body("int f() { return 2 + 3 * 4; }");
        assert!(
            text.contains("\t%tmp.0= MUL #3 , #4\n\t%tmp.1= ADD #2 , %tmp.0\n\tRET %tmp.1\n"),
            "{}",
            text
        );
    }

    #[test]
    fn test_globals_and_stores() {
        let text = body("int g; int f() { g = g + 1; g++; return g; }");
        assert!(text.contains("%tmp.0= ADD @g , #1"), "{}", text);
        assert!(text.contains("STORE %tmp.0 , !g"), "{}", text);
        assert!(text.contains("%tmp.1= ADD @g , #1\n\tSTORE %tmp.1 , !g"), "{}", text);
        assert!(text.contains("RET @g"), "{}", text);
    }

    #[test]
    fn test_shift_right_signedness() {
        assert!(body("int f(int a) { return a >> 2; }").contains("ASR a , #2"));
        assert!(body("int f(unsigned a) { return a >> 2; }").contains("SLR a , #2"));
    }

    #[test]
    fn test_shift_right_signedness_of_compound_operand() {
        let cases = [
            ("int f(unsigned u) { return (u + 1) >> 1; }", "SLR"),
            ("int f(unsigned u) { return (1 + u) >> 1; }", "SLR"),
            ("int f(int a, unsigned u) { return (a - u) >> 1; }", "SLR"),
            ("int f(unsigned *p) { return *p >> 1; }", "SLR"),
            ("int f(int a) { return (a + 1) >> 1; }", "ASR"),
            ("int f(int a, unsigned u) { return (a >> u) >> 1; }", "ASR"),
        ];
        for (source, opcode) in cases {
            let text = body(source);
            assert!(text.contains(&format!("%tmp.1= {} %tmp.0 , #1", opcode)), "{}: {}", source, text);
        }
    }

    #[test]
    fn test_unary_operators() {
        let text = body("int f(int a) { return -a + ~a + !a; }");
        assert!(text.contains("%tmp.0= SUB #0 , a"), "{}", text);
        assert!(text.contains("%tmp.1= XOR a , #-1"), "{}", text);
        assert!(text.contains("%tmp.3= CMP EQ a , #0"), "{}", text);
    }

    #[test]
    fn test_logical_operators_normalize() {
        let text = body("int f(int a, int b) { return a && b; }");
        assert!(
            text.contains(
                "%tmp.0= CMP NEQ a , #0\n\t%tmp.1= CMP NEQ b , #0\n\t%tmp.2= AND %tmp.0 , %tmp.1"
            ),
            "{}",
            text
        );
    }

    #[test]
    fn test_pointers() {
        let text = body("int f() { int x = 1; int *p = &x; *p = 5; return *p; }");
        assert!(text.contains("%tmp.0 = GEP x\n\tp = MV %tmp.0"), "{}", text);
        assert!(text.contains("STORE #5 , p"), "{}", text);
        assert!(text.contains("%tmp.1 = LOAD p\n\tRET %tmp.1"), "{}", text);
    }

    #[test]
    fn test_update_returns_updated_value() {
        let text = body("int f(int i) { int j = i++; return j; }");
        assert!(text.contains("i= ADD i , #1\n\tj = MV i"), "{}", text);
        let text = body("int f(int i) { i -= 3; return i; }");
        assert!(text.contains("i= SUB i , #3"), "{}", text);
    }

    #[test]
    fn test_call_arguments_in_order() {
        let text = body("int add(int a, int b); int f(int x) { return add(x * 2, add(1, x)); }");
        assert!(
            text.contains(
                "%tmp.0= MUL x , #2\n\t%tmp.1= CALL add (#1,x)\n\t%tmp.2= CALL add (%tmp.0,%tmp.1)"
            ),
            "{}",
            text
        );
    }

    #[test]
    fn test_string_literals_become_data_symbols() {
        let module = lower(
            "int puts(char *s); int f() { puts(\"hi\"); return 0; } int g() { puts(\"yo\"); return 0; }",
        );
        let strings: Vec<_> = module
            .symbols
            .iter()
            .filter(|(_, s)| s.kind == SymbolKind::StringLiteral)
            .map(|(_, s)| (s.name.clone(), s.literal.clone().unwrap()))
            .collect();
        assert_eq!(
            strings,
            vec![
                ("str.0".to_string(), "hi".to_string()),
                ("str.1".to_string(), "yo".to_string())
            ]
        );
        let g = module.get_function("g").unwrap().pretty_print();
        assert!(g.contains("%tmp.0 = GEP !str.1\n\t%tmp.1= CALL puts (%tmp.0)"), "{}", g);
    }
}
