//! AArch64 Code Generation
//!
//! Turns an [`IrModule`] into GNU assembler text: a `.data` section with
//! the globals and string literals, then a `.text` section with one
//! label and body per function.
//!
//! Every IR local lives in a stack slot (see [`FrameLayout`]). Each IR
//! instruction fetches its operands into scratch registers, computes, and
//! writes its result back to the destination slot; no register stays live
//! across instructions.

mod context;
mod emit;
mod frame;

pub use context::AsmGenerator;
pub use emit::escape_asciz;
pub use frame::{FrameLayout, MAX_REGISTER_ARGS};

use crate::compiler::error::CompileResult;
use crate::compiler::ir::IrModule;

/// Generate assembly text for a module
pub fn generate(module: &IrModule) -> CompileResult<String> {
    AsmGenerator::new().generate(module)
}
