//! Error types for semantic checking
//!
//! Provides structured error types with source locations for reporting
//! name resolution and type errors.

use crate::parser::token::Span;
use thiserror::Error;

/// Errors that can occur during semantic checking
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckError {
    /// Name used without a visible declaration
    #[error("Undefined identifier '{name}'")]
    UndefinedIdentifier { name: String, span: Span },

    /// Call to a name that was never declared
    #[error("Call to undeclared function '{name}'")]
    UndeclaredFunction { name: String, span: Span },

    /// Callee is not a function
    #[error("'{name}' is not a function")]
    NotAFunction { name: String, span: Span },

    /// Function name used as a value
    #[error("Function '{name}' used as a value")]
    FunctionAsValue { name: String, span: Span },

    /// Call with the wrong number of arguments
    #[error("Function '{name}' expects {expected} argument(s), got {actual}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
        span: Span,
    },

    /// Call passing more arguments than there are argument registers
    #[error("Call to '{name}' passes {count} arguments (at most 8 are supported)")]
    TooManyArguments { name: String, count: usize, span: Span },

    /// Function declared with more parameters than there are argument registers
    #[error("Function '{name}' declares {count} parameters (at most 8 are supported)")]
    TooManyParameters { name: String, count: usize, span: Span },

    /// Assignment or update of something that is not a storage location
    #[error("Invalid assignment target")]
    InvalidAssignmentTarget { span: Span },

    /// Address taken of something that is not a storage location
    #[error("Cannot take the address of this expression")]
    InvalidAddressOf { span: Span },

    /// Dereference of a non-pointer value
    #[error("Cannot dereference a value of type '{ty}'")]
    DerefNonPointer { ty: String, span: Span },

    /// `return <expr>` in a void function
    #[error("Function '{function}' returns void but a value is returned")]
    ReturnValueInVoid { function: String, span: Span },

    /// `return;` in a function with a return type
    #[error("Function '{function}' must return a value")]
    MissingReturnValue { function: String, span: Span },

    /// Two declarations of one name in the same scope
    #[error("Redeclaration of '{name}' in the same scope")]
    Redeclaration { name: String, span: Span },

    /// Two bodies for one function
    #[error("Duplicate definition of function '{name}'")]
    DuplicateFunction { name: String, span: Span },

    /// Prototype and definition disagree on the parameter count
    #[error("Conflicting declarations of '{name}': {expected} vs {actual} parameter(s)")]
    ConflictingDeclaration {
        name: String,
        expected: usize,
        actual: usize,
        span: Span,
    },
}

impl CheckError {
    /// Location of the offending construct
    pub fn span(&self) -> &Span {
        match self {
            CheckError::UndefinedIdentifier { span, .. }
            | CheckError::UndeclaredFunction { span, .. }
            | CheckError::NotAFunction { span, .. }
            | CheckError::FunctionAsValue { span, .. }
            | CheckError::ArgumentCountMismatch { span, .. }
            | CheckError::TooManyArguments { span, .. }
            | CheckError::TooManyParameters { span, .. }
            | CheckError::InvalidAssignmentTarget { span }
            | CheckError::InvalidAddressOf { span }
            | CheckError::DerefNonPointer { span, .. }
            | CheckError::ReturnValueInVoid { span, .. }
            | CheckError::MissingReturnValue { span, .. }
            | CheckError::Redeclaration { span, .. }
            | CheckError::DuplicateFunction { span, .. }
            | CheckError::ConflictingDeclaration { span, .. } => span,
        }
    }
}
