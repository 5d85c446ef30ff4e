//! IR Optimization Passes
//!
//! Block-local rewrites run on the lowered IR before code generation.
//! Each round runs strength reduction, then constant folding, then removes
//! literal temporaries nobody reads; rounds repeat until nothing changes.

mod constant_fold;
mod dce;
mod strength_reduce;

pub use constant_fold::{eval_arith, ConstantFolder};
pub use dce::DeadMoveEliminator;
pub use strength_reduce::StrengthReducer;

use crate::compiler::ir::{IrFunction, IrModule};

/// Optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptLevel {
    /// No optimizations
    #[default]
    None,
    /// Strength reduction and constant folding
    Basic,
}

/// Optimizer that runs multiple passes over the IR
pub struct Optimizer {
    level: OptLevel,
}

impl Optimizer {
    /// Create a new optimizer with the given level
    pub fn new(level: OptLevel) -> Self {
        Self { level }
    }

    /// Create an optimizer with basic optimizations
    pub fn basic() -> Self {
        Self::new(OptLevel::Basic)
    }

    /// Create an optimizer with no optimizations
    pub fn none() -> Self {
        Self::new(OptLevel::None)
    }

    pub fn level(&self) -> OptLevel {
        self.level
    }

    /// Run all optimization passes on the module
    pub fn optimize(&self, module: &mut IrModule) -> OptStats {
        let mut stats = OptStats::default();
        if self.level == OptLevel::None {
            return stats;
        }

        for func in &mut module.functions {
            let func_stats = self.optimize_function(func);
            log::debug!(
                "optimized {}: {} strength reduced, {} folded, {} moves removed in {} rounds",
                func.name,
                func_stats.strength_reduced,
                func_stats.constants_folded,
                func_stats.moves_removed,
                func_stats.rounds
            );
            stats.merge(&func_stats);
        }

        stats
    }

    /// Run the pass sequence on one function until it reaches a fixed point
    pub fn optimize_function(&self, func: &mut IrFunction) -> OptStats {
        let reducer = StrengthReducer::new();
        let folder = ConstantFolder::new();
        let dce = DeadMoveEliminator::new();
        let mut stats = OptStats::default();

        loop {
            let mut changed = 0;
            for block in &mut func.blocks {
                let reduced = reducer.reduce_block(block);
                let folded = folder.fold_block(block);
                stats.strength_reduced += reduced;
                stats.constants_folded += folded;
                changed += reduced + folded;
            }
            let removed = dce.eliminate_function(func);
            stats.moves_removed += removed;
            changed += removed;

            if changed == 0 {
                break;
            }
            stats.rounds += 1;
        }

        stats
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(OptLevel::default())
    }
}

/// Statistics about optimizations performed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptStats {
    /// Multiplications and divisions rewritten as shifts
    pub strength_reduced: usize,
    /// Operands forwarded and instructions folded
    pub constants_folded: usize,
    /// Literal temporaries removed
    pub moves_removed: usize,
    /// Rounds that changed something
    pub rounds: usize,
}

impl OptStats {
    fn merge(&mut self, other: &OptStats) {
        self.strength_reduced += other.strength_reduced;
        self.constants_folded += other.constants_folded;
        self.moves_removed += other.moves_removed;
        self.rounds = self.rounds.max(other.rounds);
    }

    /// Whether any pass rewrote anything
    pub fn changed(&self) -> bool {
        self.strength_reduced + self.constants_folded + self.moves_removed > 0
    }
}
