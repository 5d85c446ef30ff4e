//! Compiler module: IR, lowering, optimizations, and AArch64 code generation
//!
//! Takes a checked [`Program`] through
//!
//! 1. [`lower`]: AST to basic-block IR, one [`ir::IrFunction`] per definition
//! 2. [`optimize`]: strength reduction and constant folding (optional)
//! 3. [`codegen`]: IR to assembly text

pub mod codegen;
pub mod error;
pub mod ir;
pub mod lower;
pub mod optimize;

pub use codegen::{generate, AsmGenerator, FrameLayout};
pub use error::{CompileError, CompileResult};
pub use ir::{IrModule, PrettyPrint};
pub use lower::lower_program;
pub use optimize::{OptLevel, OptStats, Optimizer};

use crate::parser::Program;

/// Options for one compilation
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Which optimization passes to run
    pub opt_level: OptLevel,
    /// Also render the (optimized) IR in AVM text form
    pub emit_ir: bool,
}

impl CompileOptions {
    pub fn new(opt_level: OptLevel) -> Self {
        Self {
            opt_level,
            emit_ir: false,
        }
    }

    pub fn with_emit_ir(mut self, emit_ir: bool) -> Self {
        self.emit_ir = emit_ir;
        self
    }
}

/// Result of a successful compilation
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// AArch64 assembly text
    pub assembly: String,
    /// Pretty-printed IR, when requested
    pub ir: Option<String>,
    /// What the optimizer did
    pub stats: OptStats,
}

/// Lower, optimize and generate code for a checked program
pub fn compile_program(program: &Program, options: &CompileOptions) -> CompileResult<CompileOutput> {
    let mut module = lower_program(program)?;

    let stats = Optimizer::new(options.opt_level).optimize(&mut module);
    if stats.changed() {
        log::debug!(
            "optimizer: {} strength reduced, {} folded, {} moves removed",
            stats.strength_reduced,
            stats.constants_folded,
            stats.moves_removed
        );
    }

    let ir = options.emit_ir.then(|| module.pretty_print());
    let assembly = generate(&module)?;
    log::debug!("generated {} bytes of assembly", assembly.len());

    Ok(CompileOutput {
        assembly,
        ir,
        stats,
    })
}
