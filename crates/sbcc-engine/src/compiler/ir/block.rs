//! Basic Blocks
//!
//! A basic block is a label plus a sequence of instructions. The terminator,
//! when present, is the last instruction; a block without one falls through
//! to the next block in the function.

use super::instr::IrInstr;

/// Basic block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BasicBlockId(pub u32);

impl BasicBlockId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BasicBlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A basic block: sequence of instructions with single entry and exit
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    /// Unique identifier for this block
    pub id: BasicBlockId,
    /// Label used as the branch target name (`entry`, `if.true.1`, ...)
    pub label: String,
    /// Instructions in this block, terminator included
    pub instructions: Vec<IrInstr>,
}

impl BasicBlock {
    /// Create a new empty basic block with a label
    pub fn with_label(id: BasicBlockId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            instructions: Vec::new(),
        }
    }

    /// Add an instruction to this block
    pub fn add_instr(&mut self, instr: IrInstr) {
        self.instructions.push(instr);
    }

    /// Append a terminator unless the block already has one.
    ///
    /// Returns whether the terminator was appended.
    pub fn set_terminator(&mut self, term: IrInstr) -> bool {
        if self.is_terminated() {
            return false;
        }
        self.instructions.push(term);
        true
    }

    /// The terminating instruction, if any
    pub fn terminator(&self) -> Option<&IrInstr> {
        self.instructions.last().filter(|i| i.is_terminator())
    }

    /// Check if this block ends in a terminator
    pub fn is_terminated(&self) -> bool {
        self.terminator().is_some()
    }

    /// Labels of the blocks this block branches to
    pub fn successors(&self) -> Vec<&str> {
        self.terminator()
            .map(|t| t.branch_targets())
            .unwrap_or_default()
    }

    /// Get the number of instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if this block has no instructions
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
