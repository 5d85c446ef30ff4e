//! Stack Frame Layout
//!
//! Every local, temporary and parameter of a function lives in an 8-byte
//! stack slot. Slot `i` sits at `[sp, #8*i]` once the prologue has run; the
//! saved frame pointer and link register sit above the slots.
//!
//! Slot storage is bounded by what the prologue's two-part `sub sp`
//! encodes.

use super::emit::MAX_SPLIT_IMMEDIATE;
use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{IrFunction, Local};
use rustc_hash::FxHashMap;

/// Maximum number of register-passed arguments
pub const MAX_REGISTER_ARGS: usize = 8;

/// Bytes reserved for the saved x29/x30 pair
pub const SAVE_AREA: usize = 16;

/// Slot assignment for one function
#[derive(Debug, Clone)]
pub struct FrameLayout {
    /// Slot names in assignment order
    slots: Vec<Local>,
    /// Slot index by name
    index: FxHashMap<Local, usize>,
    /// Bytes of slot storage, a multiple of 16
    stack_size: usize,
}

impl FrameLayout {
    /// Compute the layout of `func`.
    ///
    /// Locals are assigned in the order their definitions first appear,
    /// parameters after them.
    pub fn compute(func: &IrFunction) -> CompileResult<Self> {
        if func.params.len() > MAX_REGISTER_ARGS {
            return Err(CompileError::TooManyParameters {
                function: func.name.clone(),
                count: func.params.len(),
            });
        }

        let mut layout = Self {
            slots: Vec::new(),
            index: FxHashMap::default(),
            stack_size: 0,
        };

        for instr in func.blocks.iter().flat_map(|b| &b.instructions) {
            if let Some(dest) = instr.dest() {
                if !func.params.contains(dest) {
                    layout.assign(dest);
                }
            }
        }
        for param in &func.params {
            layout.assign(param);
        }

        layout.stack_size = (layout.slots.len() * 8).next_multiple_of(16);
        if layout.stack_size > MAX_SPLIT_IMMEDIATE {
            return Err(CompileError::FrameTooLarge {
                function: func.name.clone(),
                size: layout.frame_size(),
            });
        }

        Ok(layout)
    }

    fn assign(&mut self, local: &Local) {
        if !self.index.contains_key(local) {
            self.index.insert(local.clone(), self.slots.len());
            self.slots.push(local.clone());
        }
    }

    /// Byte offset of `local` from the stack pointer
    pub fn offset(&self, local: &Local) -> Option<usize> {
        self.index.get(local).map(|&slot| slot * 8)
    }

    /// Bytes of slot storage
    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Total bytes the prologue takes off the stack pointer
    pub fn frame_size(&self) -> usize {
        self.stack_size + SAVE_AREA
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot names in assignment order
    pub fn slots(&self) -> &[Local] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::{ArithOp, BasicBlock, BasicBlockId, IrInstr, Operand};
    use crate::parser::{CType, SymbolId};

    fn function(params: Vec<Local>, instrs: Vec<IrInstr>) -> IrFunction {
        let mut func = IrFunction::new("f", SymbolId(0), params, CType::int());
        let mut block = BasicBlock::with_label(BasicBlockId(0), "entry");
        for instr in instrs {
            block.add_instr(instr);
        }
        func.add_block(block);
        func
    }

    #[test]
    fn test_locals_before_params() {
        let func = function(
            vec![Local::var("x")],
            vec![
                IrInstr::Alloca {
                    name: Local::var("a"),
                    symbol: SymbolId(1),
                },
                IrInstr::Arithmetic {
                    dest: Local::Temp(0),
                    op: ArithOp::Add,
                    src1: Operand::var("x"),
                    src2: Operand::Literal(1),
                },
                IrInstr::Move {
                    dest: Local::var("x"),
                    value: Operand::temp(0),
                },
                IrInstr::Return {
                    value: Some(Operand::var("x")),
                },
            ],
        );

        let layout = FrameLayout::compute(&func).unwrap();
        assert_eq!(layout.slots(), &[Local::var("a"), Local::Temp(0), Local::var("x")]);
        assert_eq!(layout.offset(&Local::var("x")), Some(16));
        assert_eq!(layout.stack_size(), 32);
        assert_eq!(layout.frame_size(), 48);
    }

    #[test]
    fn test_empty_frame() {
        let func = function(Vec::new(), vec![IrInstr::Return { value: None }]);
        let layout = FrameLayout::compute(&func).unwrap();
        assert_eq!(layout.stack_size(), 0);
        assert_eq!(layout.frame_size(), 16);
    }

    #[test]
    fn test_too_many_params() {
        let params = (0..9).map(|i| Local::var(format!("p{}", i))).collect();
        let func = function(params, vec![IrInstr::Return { value: None }]);
        assert_eq!(
            FrameLayout::compute(&func).unwrap_err(),
            CompileError::TooManyParameters {
                function: "f".to_string(),
                count: 9
            }
        );
    }

    #[test]
    fn test_frame_past_twelve_bit_immediate() {
        let instrs = (0..600)
            .map(|i| IrInstr::Move {
                dest: Local::Temp(i),
                value: Operand::Literal(0),
            })
            .collect();
        let func = function(vec![Local::var("x")], instrs);

        let layout = FrameLayout::compute(&func).unwrap();
        assert_eq!(layout.slot_count(), 601);
        assert_eq!(layout.stack_size(), 4816);
        assert_eq!(layout.offset(&Local::var("x")), Some(4800));
    }
}
