//! IR Functions
//!
//! Functions in the IR contain parameters, local variables, and basic blocks.

use super::block::{BasicBlock, BasicBlockId};
use super::value::Local;
use crate::parser::{CType, SymbolId};
use rustc_hash::{FxHashMap, FxHashSet};

/// An IR function
#[derive(Debug, Clone)]
pub struct IrFunction {
    /// Function name
    pub name: String,
    /// Symbol of the function's prototype
    pub symbol: SymbolId,
    /// Parameter names, in argument register order
    pub params: Vec<Local>,
    /// Return type
    pub return_ty: CType,
    /// Declared locals and temporaries, in definition order
    pub locals: Vec<Local>,
    /// Basic blocks (in order)
    pub blocks: Vec<BasicBlock>,
    /// Entry block ID
    pub entry_block: BasicBlockId,
    /// Block lookup map for fast access
    block_map: FxHashMap<BasicBlockId, usize>,
}

impl IrFunction {
    /// Create a new function
    pub fn new(
        name: impl Into<String>,
        symbol: SymbolId,
        params: Vec<Local>,
        return_ty: CType,
    ) -> Self {
        Self {
            name: name.into(),
            symbol,
            params,
            return_ty,
            locals: Vec::new(),
            blocks: Vec::new(),
            entry_block: BasicBlockId(0),
            block_map: FxHashMap::default(),
        }
    }

    /// Add a local variable
    pub fn add_local(&mut self, local: Local) {
        self.locals.push(local);
    }

    /// Add a basic block and return its ID
    pub fn add_block(&mut self, block: BasicBlock) -> BasicBlockId {
        let id = block.id;
        let index = self.blocks.len();
        self.block_map.insert(id, index);
        self.blocks.push(block);
        id
    }

    /// Get a block by ID
    pub fn get_block(&self, id: BasicBlockId) -> Option<&BasicBlock> {
        self.block_map.get(&id).map(|&idx| &self.blocks[idx])
    }

    /// Get a mutable block by ID
    pub fn get_block_mut(&mut self, id: BasicBlockId) -> Option<&mut BasicBlock> {
        self.block_map
            .get(&id)
            .copied()
            .map(|idx| &mut self.blocks[idx])
    }

    /// Find a block by its label
    pub fn block_by_label(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    /// Get the entry block
    pub fn entry(&self) -> Option<&BasicBlock> {
        self.get_block(self.entry_block)
    }

    /// Get the number of blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if this function has any blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over all blocks
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter()
    }

    /// Compute the total number of instructions across all blocks
    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.len()).sum()
    }

    /// Validate the function structure
    pub fn validate(&self) -> Result<(), String> {
        let Some(first) = self.blocks.first() else {
            return Err("Function has no blocks".to_string());
        };
        if first.label != "entry" {
            return Err(format!("First block is '{}', expected 'entry'", first.label));
        }

        let labels: FxHashSet<&str> = self.blocks.iter().map(|b| b.label.as_str()).collect();
        if labels.len() != self.blocks.len() {
            return Err("Duplicate block labels".to_string());
        }

        let mut temps = FxHashSet::default();
        let last = self.blocks.len() - 1;
        for (index, block) in self.blocks.iter().enumerate() {
            let body = block.len().saturating_sub(1);
            for (pos, instr) in block.instructions.iter().enumerate() {
                if instr.is_terminator() && pos != body {
                    return Err(format!(
                        "Block {} has a terminator before its last instruction",
                        block.label
                    ));
                }
                if let Some(Local::Temp(n)) = instr.dest() {
                    if !temps.insert(*n) {
                        return Err(format!("Temporary %tmp.{} is defined twice", n));
                    }
                }
            }

            for target in block.successors() {
                if !labels.contains(target) {
                    return Err(format!(
                        "Block {} references non-existent block {}",
                        block.label, target
                    ));
                }
            }

            // Without a terminator a block falls through, so it needs a successor
            if !block.is_terminated() && index == last {
                return Err(format!("Block {} is a dead end", block.label));
            }
        }

        Ok(())
    }
}
