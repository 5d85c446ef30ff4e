//! Semantic checker
//!
//! Runs after parsing and rejects programs the compiler core cannot lower:
//! unresolved names, malformed calls, invalid assignment targets, mismatched
//! returns and duplicate declarations.

mod checker;
mod error;

pub use checker::Checker;
pub use error::CheckError;

/// Argument registers available for parameters and call arguments.
pub const MAX_ARGS: usize = 8;
