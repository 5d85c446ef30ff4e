//! Compilation errors

use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unsupported opcode: {opcode} has no AArch64 mnemonic")]
    UnsupportedOpcode { opcode: String },

    #[error("Unknown operand '{operand}' in function {function}")]
    UnknownOperand { function: String, operand: String },

    #[error("Call to {callee} passes {count} arguments (max 8)")]
    TooManyArguments { callee: String, count: usize },

    #[error("Function {function} has {count} parameters (max 8)")]
    TooManyParameters { function: String, count: usize },

    #[error("Stack frame of {function} is too large ({size} bytes)")]
    FrameTooLarge { function: String, size: usize },

    #[error("Malformed function {function}: {message}")]
    MalformedFunction { function: String, message: String },
}
