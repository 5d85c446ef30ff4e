//! Constant Folding Optimization
//!
//! Evaluates arithmetic on literal operands at compile time with AArch64
//! 64-bit semantics, and forwards the folded literals of temporaries to
//! later arithmetic in the same block.

use crate::compiler::ir::{ArithOp, BasicBlock, IrInstr, Local, Operand};
use rustc_hash::FxHashMap;

/// Evaluate `a op b` the way the target instruction would
pub fn eval_arith(op: ArithOp, a: i64, b: i64) -> Option<i64> {
    let (ua, ub) = (a as u64, b as u64);
    let value = match op {
        ArithOp::Add => a.wrapping_add(b),
        ArithOp::Sub => a.wrapping_sub(b),
        ArithOp::Mul => a.wrapping_mul(b),
        // udiv, and the remainder of the same unsigned division
        ArithOp::Div => ua.checked_div(ub)? as i64,
        ArithOp::Mod => ua.checked_rem(ub)? as i64,
        ArithOp::And => a & b,
        ArithOp::Orr => a | b,
        ArithOp::Xor => a ^ b,
        ArithOp::Sll | ArithOp::Slr | ArithOp::Asr if !(0..64).contains(&b) => return None,
        ArithOp::Sll => (ua << b) as i64,
        ArithOp::Slr => (ua >> b) as i64,
        ArithOp::Asr => a >> b,
    };
    Some(value)
}

/// Constant folding optimizer
pub struct ConstantFolder;

impl ConstantFolder {
    /// Create a new constant folder
    pub fn new() -> Self {
        Self
    }

    /// Fold constants in a basic block, returning the number of rewrites.
    ///
    /// Each block gets its own fresh constants map; nothing is propagated
    /// across block boundaries.
    pub fn fold_block(&self, block: &mut BasicBlock) -> usize {
        let mut constants: FxHashMap<u32, i64> = FxHashMap::default();
        let mut rewrites = 0;

        for instr in &mut block.instructions {
            if let IrInstr::Arithmetic { src1, src2, .. } = instr {
                for src in [src1, src2] {
                    if let Operand::Local(Local::Temp(n)) = src {
                        if let Some(&value) = constants.get(&*n) {
                            *src = Operand::Literal(value);
                            rewrites += 1;
                        }
                    }
                }
            }

            if let IrInstr::Arithmetic {
                dest,
                op,
                src1: Operand::Literal(a),
                src2: Operand::Literal(b),
            } = instr
            {
                if let Some(value) = eval_arith(*op, *a, *b) {
                    let dest = std::mem::replace(dest, Local::Temp(0));
                    *instr = IrInstr::Move {
                        dest,
                        value: Operand::Literal(value),
                    };
                    log::trace!("folded in {}: {}", block.label, instr);
                    rewrites += 1;
                }
            }

            if let IrInstr::Move {
                dest: Local::Temp(n),
                value: Operand::Literal(value),
            } = instr
            {
                constants.insert(*n, *value);
            }
        }

        rewrites
    }
}

impl Default for ConstantFolder {
    fn default() -> Self {
        Self::new()
    }
}
