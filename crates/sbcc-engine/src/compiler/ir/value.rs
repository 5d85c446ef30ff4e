//! IR Values and Operands
//!
//! Defines the operand kinds used in IR instructions. Each kind prints with
//! its AVM sigil: `#14`, `@counter`, `!str.0`, `x`.

use std::fmt;

/// A stack-resident name: a source variable or a compiler temporary
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Local {
    /// Parameter or declared local (uniquified when shadowed: `x.1`)
    Var(String),
    /// Temporary introduced by lowering
    Temp(u32),
}

impl Local {
    pub fn var(name: impl Into<String>) -> Self {
        Local::Var(name.into())
    }

    /// Is this a compiler temporary
    pub fn is_temp(&self) -> bool {
        matches!(self, Local::Temp(_))
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Local::Var(name) => write!(f, "{}", name),
            Local::Temp(n) => write!(f, "%tmp.{}", n),
        }
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Integer literal (`#N`)
    Literal(i64),
    /// Value of a global variable (`@name`)
    Global(String),
    /// Address of a data label (`!name`)
    Label(String),
    /// Stack slot
    Local(Local),
}

impl Operand {
    pub fn global(name: impl Into<String>) -> Self {
        Operand::Global(name.into())
    }

    pub fn label(name: impl Into<String>) -> Self {
        Operand::Label(name.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Operand::Local(Local::var(name))
    }

    pub fn temp(n: u32) -> Self {
        Operand::Local(Local::Temp(n))
    }

    /// The literal value, if this is a literal
    pub fn as_literal(&self) -> Option<i64> {
        match self {
            Operand::Literal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Operand::Literal(_))
    }

    /// The stack-resident name, if this is a local
    pub fn as_local(&self) -> Option<&Local> {
        match self {
            Operand::Local(local) => Some(local),
            _ => None,
        }
    }
}

impl From<Local> for Operand {
    fn from(local: Local) -> Self {
        Operand::Local(local)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "#{}", v),
            Operand::Global(name) => write!(f, "@{}", name),
            Operand::Label(name) => write!(f, "!{}", name),
            Operand::Local(local) => write!(f, "{}", local),
        }
    }
}
