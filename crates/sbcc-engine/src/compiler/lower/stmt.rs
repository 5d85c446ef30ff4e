//! Statement Lowering
//!
//! Converts AST statements to IR instructions.

use super::{Lowered, Lowerer};
use crate::compiler::error::CompileResult;
use crate::compiler::ir::{BasicBlockId, IrInstr, Local, Operand};
use crate::parser::ast::{Declaration, ReturnStatement, Statement};
use crate::parser::SymbolId;

impl<'a> Lowerer<'a> {
    /// Lower a statement sequence into the current block.
    ///
    /// Returns the blocks through which control leaves the end of the
    /// sequence without a terminator. Statements after a terminator are
    /// unreachable and skipped.
    pub(super) fn lower_sequence(
        &mut self,
        statements: &[&Statement],
    ) -> CompileResult<Vec<BasicBlockId>> {
        for (index, stmt) in statements.iter().enumerate() {
            if self.current_block_is_terminated() {
                return Ok(Vec::new());
            }
            if let Lowered::Control = self.lower_stmt(stmt)? {
                return self.lower_control(stmt, &statements[index + 1..]);
            }
        }

        if self.current_block_is_terminated() {
            Ok(Vec::new())
        } else {
            Ok(vec![self.current_block])
        }
    }

    /// Lower a statement inline, or report it as a control construct
    pub(super) fn lower_stmt(&mut self, stmt: &Statement) -> CompileResult<Lowered> {
        match stmt {
            Statement::Expression(s) => self.lower_expr(&s.expression).map(Lowered::Value),
            Statement::Declaration(decl) => {
                self.lower_declaration(decl)?;
                Ok(Lowered::Unit)
            }
            Statement::Return(ret) => {
                self.lower_return(ret)?;
                Ok(Lowered::Unit)
            }
            Statement::If(_) | Statement::While(_) | Statement::For(_) | Statement::Block(_) => {
                Ok(Lowered::Control)
            }
            Statement::Empty(_) => Ok(Lowered::Unit),
        }
    }

    /// Emit one Alloca per local of a scope, naming each slot
    pub(super) fn emit_allocas(&mut self, locals: &[SymbolId]) -> CompileResult<()> {
        for &symbol in locals {
            let name = Local::Var(self.declare_name(symbol)?);
            self.func.add_local(name.clone());
            self.emit(IrInstr::Alloca { name, symbol })?;
        }
        Ok(())
    }

    /// A literal initializer lives on the symbol and is stored by the
    /// Alloca; any other initializer is evaluated here.
    fn lower_declaration(&mut self, decl: &Declaration) -> CompileResult<()> {
        let Some(init) = &decl.initializer else {
            return Ok(());
        };
        if init.as_int_literal().is_some() {
            return Ok(());
        }

        let value = self.lower_expr(init)?;
        let dest = Local::Var(self.local_name(decl.symbol)?.to_string());
        self.emit(IrInstr::Move { dest, value })
    }

    fn lower_return(&mut self, ret: &ReturnStatement) -> CompileResult<()> {
        let value: Option<Operand> = match &ret.value {
            Some(expr) => Some(self.lower_expr(expr)?),
            None => None,
        };
        self.set_terminator(IrInstr::Return { value })
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::ir::{IrFunction, IrInstr, Local, Operand, PrettyPrint};
    use crate::compiler::lower::lower_program;
    use crate::parser::Parser;

    fn lower_fn(source: &str) -> IrFunction {
        let program = Parser::new(source).unwrap().parse().unwrap();
        let module = lower_program(&program).unwrap();
        module.functions.into_iter().last().unwrap()
    }

    #[test]
    fn test_literal_initializer_stays_on_alloca() {
        let f = lower_fn("int f() { int a = 5; return a; }");
        assert_eq!(f.pretty_print(), "function f() {\nentry:\n\tALLOCA a\n\tRET a\n}\n");
    }

    #[test]
    fn test_expression_initializer_moves() {
        let f = lower_fn("int f(int b) { int a = b + 1; return a; }");
        let instrs = &f.blocks[0].instructions;
        assert!(matches!(&instrs[0], IrInstr::Alloca { name, .. } if *name == Local::var("a")));
        assert_eq!(
            instrs[2],
            IrInstr::Move {
                dest: Local::var("a"),
                value: Operand::temp(0),
            }
        );
        assert_eq!(
            f.pretty_print(),
            "function f(b) {\nentry:\n\tALLOCA a\n\t%tmp.0= ADD b , #1\n\ta = MV %tmp.0\n\tRET a\n}\n"
        );
    }

    #[test]
    fn test_code_after_return_is_dropped() {
        let f = lower_fn("int f() { return 1; return 2; }");
        assert_eq!(f.block_count(), 1);
        assert_eq!(f.blocks[0].len(), 1);
    }

    #[test]
    fn test_negative_literal_initializer() {
        let program = Parser::new("int f() { int a = -3; return a; }")
            .unwrap()
            .parse()
            .unwrap();
        let module = lower_program(&program).unwrap();
        let a = module.symbols.iter().find(|(_, s)| s.name == "a").unwrap().1;
        assert_eq!(a.value, -3);
        assert!(!module.functions[0].pretty_print().contains("SUB"));
    }
}
