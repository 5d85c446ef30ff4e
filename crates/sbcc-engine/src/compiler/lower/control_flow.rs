//! Control Flow Lowering
//!
//! Materializes if, while and for statements as branches between new basic
//! blocks. Each construct receives the statements that follow it in the
//! enclosing sequence and lowers them into its continuation block.

use super::Lowerer;
use crate::compiler::error::CompileResult;
use crate::compiler::ir::{BasicBlockId, IrInstr, Operand};
use crate::parser::ast::{
    Block, Expression, ForStatement, IfStatement, Statement, WhileStatement,
};

impl<'a> Lowerer<'a> {
    /// Lower a control construct followed by `rest`.
    ///
    /// Returns the open leaf blocks of the whole remaining sequence.
    pub(super) fn lower_control(
        &mut self,
        stmt: &Statement,
        rest: &[&Statement],
    ) -> CompileResult<Vec<BasicBlockId>> {
        match stmt {
            Statement::If(s) => self.lower_if(s, rest),
            Statement::While(s) => self.lower_while(s, rest),
            Statement::For(s) => self.lower_for(s, rest),
            Statement::Block(block) => self.lower_block(block, rest),
            other => {
                // Not a control construct: lower inline and carry on
                self.lower_stmt(other)?;
                self.lower_sequence(rest)
            }
        }
    }

    /// A nested block declares its locals, then its statements run straight
    /// into the enclosing sequence.
    fn lower_block(&mut self, block: &Block, rest: &[&Statement]) -> CompileResult<Vec<BasicBlockId>> {
        self.emit_allocas(&block.scope.locals)?;
        let mut statements: Vec<&Statement> = block.statements.iter().collect();
        statements.extend_from_slice(rest);
        self.lower_sequence(&statements)
    }

    fn lower_if(&mut self, s: &IfStatement, rest: &[&Statement]) -> CompileResult<Vec<BasicBlockId>> {
        let cond = self.lower_expr(&s.condition)?;
        let true_label = self.new_label("if.true");
        let false_label = self.new_label("if.false");
        self.set_terminator(IrInstr::Branch {
            cond,
            true_label: true_label.clone(),
            false_label: Some(false_label.clone()),
        })?;

        // True arm first, then the false arm (an empty one falls through)
        self.add_block(true_label);
        let mut leaves = self.lower_sequence(&[s.then_branch.as_ref()])?;

        self.add_block(false_label);
        let else_branch: Vec<&Statement> = s.else_branch.iter().map(|b| b.as_ref()).collect();
        leaves.extend(self.lower_sequence(&else_branch)?);

        if rest.is_empty() || leaves.is_empty() {
            return Ok(leaves);
        }

        let cont_label = self.new_label("if.cont");
        self.join(&leaves, &cont_label)?;
        self.add_block(cont_label);
        self.lower_sequence(rest)
    }

    fn lower_while(
        &mut self,
        s: &WhileStatement,
        rest: &[&Statement],
    ) -> CompileResult<Vec<BasicBlockId>> {
        let test_label = self.new_label("while.test");
        let body_label = self.new_label("while.body");
        let cont_label = self.new_label("while.cont");

        self.loop_blocks(
            &test_label,
            &body_label,
            &cont_label,
            Some(&s.condition),
            &s.body,
            None,
        )?;

        self.add_block(cont_label);
        self.lower_sequence(rest)
    }

    /// `for (init; test; update) body` runs `init` in the current block and
    /// then loops like a while whose body ends with `update`.
    fn lower_for(&mut self, s: &ForStatement, rest: &[&Statement]) -> CompileResult<Vec<BasicBlockId>> {
        self.emit_allocas(&s.scope.locals)?;
        if let Some(init) = &s.init {
            self.lower_stmt(init)?;
        }

        let test_label = self.new_label("for.test");
        let body_label = self.new_label("for.body");
        let cont_label = self.new_label("for.cont");

        self.loop_blocks(
            &test_label,
            &body_label,
            &cont_label,
            s.test.as_ref(),
            &s.body,
            s.update.as_ref(),
        )?;

        self.add_block(cont_label);
        self.lower_sequence(rest)
    }

    /// Emit the test and body blocks of a loop; the continuation block is
    /// left for the caller.
    fn loop_blocks(
        &mut self,
        test_label: &str,
        body_label: &str,
        cont_label: &str,
        condition: Option<&Expression>,
        body: &Statement,
        update: Option<&Expression>,
    ) -> CompileResult<()> {
        self.set_terminator(IrInstr::jump(test_label))?;

        self.add_block(test_label);
        let cond = match condition {
            Some(expr) => self.lower_expr(expr)?,
            None => Operand::Literal(1),
        };
        self.set_terminator(IrInstr::Branch {
            cond,
            true_label: body_label.to_string(),
            false_label: Some(cont_label.to_string()),
        })?;

        self.add_block(body_label);
        let leaves = self.lower_sequence(&[body])?;

        let Some(update) = update else {
            return self.join(&leaves, test_label);
        };

        match leaves.as_slice() {
            [] => Ok(()),
            // Straight-line body: the update joins its only leaf
            [leaf] if *leaf == self.current_block => {
                self.lower_expr(update)?;
                self.set_terminator(IrInstr::jump(test_label))
            }
            _ => {
                let step_label = self.new_label("for.step");
                self.join(&leaves, &step_label)?;
                self.add_block(step_label);
                self.lower_expr(update)?;
                self.set_terminator(IrInstr::jump(test_label))
            }
        }
    }

    /// Branch every open leaf to `label`
    fn join(&mut self, leaves: &[BasicBlockId], label: &str) -> CompileResult<()> {
        for &leaf in leaves {
            self.terminate(leaf, IrInstr::jump(label))?;
        }
        Ok(())
    }
}
