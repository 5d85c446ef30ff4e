//! Dead Move Elimination
//!
//! Removes temporaries whose only definition is a literal Move that nothing
//! reads any more, typically left behind after constant folding forwarded
//! the literal into its users.

use crate::compiler::ir::{IrFunction, IrInstr, Local, Operand};
use rustc_hash::FxHashSet;

/// Dead move eliminator
pub struct DeadMoveEliminator;

impl DeadMoveEliminator {
    /// Create a new DCE pass
    pub fn new() -> Self {
        Self
    }

    /// Eliminate dead literal moves in a function, returning how many were
    /// removed
    pub fn eliminate_function(&self, func: &mut IrFunction) -> usize {
        let mut total = 0;

        // Iterate until no more changes (fixed-point)
        loop {
            let used = self.collect_used_temps(func);
            let removed = self.remove_dead_moves(func, &used);
            if removed == 0 {
                break;
            }
            total += removed;
        }

        total
    }

    fn collect_used_temps(&self, func: &IrFunction) -> FxHashSet<u32> {
        let mut used = FxHashSet::default();
        for instr in func.blocks.iter().flat_map(|b| &b.instructions) {
            for operand in instr.operands() {
                if let Operand::Local(Local::Temp(n)) = operand {
                    used.insert(*n);
                }
            }
        }
        used
    }

    fn remove_dead_moves(&self, func: &mut IrFunction, used: &FxHashSet<u32>) -> usize {
        let mut removed: Vec<u32> = Vec::new();

        for block in &mut func.blocks {
            let mut new_instrs = Vec::with_capacity(block.instructions.len());
            for instr in block.instructions.drain(..) {
                match &instr {
                    IrInstr::Move {
                        dest: Local::Temp(n),
                        value: Operand::Literal(_),
                    } if !used.contains(n) => {
                        log::trace!("removed dead move in {}: {}", block.label, instr);
                        removed.push(*n);
                    }
                    _ => new_instrs.push(instr),
                }
            }
            block.instructions = new_instrs;
        }

        if !removed.is_empty() {
            func.locals
                .retain(|local| !matches!(local, Local::Temp(n) if removed.contains(n)));
        }
        removed.len()
    }
}

impl Default for DeadMoveEliminator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::{BasicBlock, BasicBlockId};
    use crate::parser::{CType, SymbolId};

    fn function(instrs: Vec<IrInstr>) -> IrFunction {
        let mut func = IrFunction::new("f", SymbolId(0), Vec::new(), CType::int());
        let mut block = BasicBlock::with_label(BasicBlockId(0), "entry");
        for instr in instrs {
            if let Some(dest) = instr.dest() {
                func.add_local(dest.clone());
            }
            block.add_instr(instr);
        }
        func.add_block(block);
        func
    }

    #[test]
    fn test_unread_literal_move_removed() {
        let mut func = function(vec![
            IrInstr::Move {
                dest: Local::Temp(0),
                value: Operand::Literal(12),
            },
            IrInstr::Move {
                dest: Local::Temp(1),
                value: Operand::Literal(14),
            },
            IrInstr::Return {
                value: Some(Operand::temp(1)),
            },
        ]);

        assert_eq!(DeadMoveEliminator::new().eliminate_function(&mut func), 1);
        assert_eq!(func.instruction_count(), 2);
        assert_eq!(func.locals, vec![Local::Temp(1)]);
    }

    #[test]
    fn test_named_locals_and_non_literals_kept() {
        let mut func = function(vec![
            IrInstr::Move {
                dest: Local::var("a"),
                value: Operand::Literal(1),
            },
            IrInstr::Move {
                dest: Local::Temp(0),
                value: Operand::var("a"),
            },
            IrInstr::Return { value: None },
        ]);

        assert_eq!(DeadMoveEliminator::new().eliminate_function(&mut func), 0);
        assert_eq!(func.instruction_count(), 3);
    }
}
