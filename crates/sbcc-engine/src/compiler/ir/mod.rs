//! Intermediate Representation (IR) for sbcc
//!
//! The IR sits between the checked AST and AArch64 assembly. It is
//! three-address code (the AVM instruction set) grouped into basic blocks.
//!
//! # Structure
//!
//! - `IrModule` - Functions plus the global symbol table
//! - `IrFunction` - A function with parameters, locals, and basic blocks
//! - `BasicBlock` - A labelled sequence of instructions, terminator last
//! - `IrInstr` - Three-address code instructions
//! - `Operand` - Literal, global, data label, or stack-resident local

pub mod block;
pub mod function;
pub mod instr;
pub mod module;
pub mod pretty;
pub mod value;

pub use block::{BasicBlock, BasicBlockId};
pub use function::IrFunction;
pub use instr::{ArithOp, CmpCode, IrInstr};
pub use module::IrModule;
pub use pretty::PrettyPrint;
pub use value::{Local, Operand};
