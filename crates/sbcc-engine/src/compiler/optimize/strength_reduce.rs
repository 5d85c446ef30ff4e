//! Strength Reduction
//!
//! Rewrites multiplication and division by a power-of-two literal into
//! shifts: `x * 8` becomes `SLL x , #3`, `x / 8` becomes `ASR x , #3`.

use crate::compiler::ir::{ArithOp, BasicBlock, IrInstr, Operand};

/// Shift amount `k` when `operand` is the literal `2^k`
fn power_of_two(operand: &Operand) -> Option<i64> {
    let value = operand.as_literal()? as u64;
    value
        .is_power_of_two()
        .then(|| i64::from(value.trailing_zeros()))
}

/// Strength reduction pass
pub struct StrengthReducer;

impl StrengthReducer {
    /// Create a new strength reduction pass
    pub fn new() -> Self {
        Self
    }

    /// Rewrite one block in place, returning the number of rewrites
    pub fn reduce_block(&self, block: &mut BasicBlock) -> usize {
        let mut rewrites = 0;

        for instr in &mut block.instructions {
            let IrInstr::Arithmetic { op, src1, src2, .. } = instr else {
                continue;
            };

            match op {
                ArithOp::Mul => match (power_of_two(src1), power_of_two(src2)) {
                    (Some(k), None) => {
                        // Keep the shift amount in src2
                        *src1 = std::mem::replace(src2, Operand::Literal(k));
                    }
                    (None, Some(k)) => *src2 = Operand::Literal(k),
                    _ => continue,
                },
                ArithOp::Div => match power_of_two(src2) {
                    Some(k) => *src2 = Operand::Literal(k),
                    None => continue,
                },
                _ => continue,
            }

            *op = if *op == ArithOp::Mul {
                ArithOp::Sll
            } else {
                ArithOp::Asr
            };
            log::trace!("strength reduced in {}: {}", block.label, instr);
            rewrites += 1;
        }

        rewrites
    }
}

impl Default for StrengthReducer {
    fn default() -> Self {
        Self::new()
    }
}
