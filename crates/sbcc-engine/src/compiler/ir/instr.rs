//! IR Instructions
//!
//! Three-address code instructions for the IR. Operand shapes follow the
//! AVM instruction set: every value-producing instruction defines exactly
//! one fresh [`Local`].

use super::value::{Local, Operand};
use crate::parser::SymbolId;
use std::fmt;

/// Arithmetic opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// Shift left logical
    Sll,
    /// Shift right logical
    Slr,
    /// Shift right arithmetic
    Asr,
    And,
    Orr,
    Xor,
}

impl ArithOp {
    /// AVM opcode name
    pub fn name(&self) -> &'static str {
        match self {
            ArithOp::Add => "ADD",
            ArithOp::Sub => "SUB",
            ArithOp::Mul => "MUL",
            ArithOp::Div => "DIV",
            ArithOp::Mod => "MOD",
            ArithOp::Sll => "SLL",
            ArithOp::Slr => "SLR",
            ArithOp::Asr => "ASR",
            ArithOp::And => "AND",
            ArithOp::Orr => "ORR",
            ArithOp::Xor => "XOR",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpCode {
    /// Less than
    Lt,
    /// More than
    Mt,
    /// Less than or equal
    LtEq,
    /// More than or equal
    MtEq,
    Eq,
    Neq,
}

impl CmpCode {
    /// AVM comparison name
    pub fn name(&self) -> &'static str {
        match self {
            CmpCode::Lt => "LT",
            CmpCode::Mt => "MT",
            CmpCode::LtEq => "LTEQ",
            CmpCode::MtEq => "MTEQ",
            CmpCode::Eq => "EQ",
            CmpCode::Neq => "NEQ",
        }
    }
}

impl fmt::Display for CmpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// IR instruction (Three-Address Code)
#[derive(Debug, Clone, PartialEq)]
pub enum IrInstr {
    /// Arithmetic: dest = src1 op src2
    Arithmetic {
        dest: Local,
        op: ArithOp,
        src1: Operand,
        src2: Operand,
    },

    /// Comparison: dest = (op1 cmp op2) ? -1 : 0
    Compare {
        dest: Local,
        cmp: CmpCode,
        op1: Operand,
        op2: Operand,
    },

    /// Load through a pointer: dest = *addr
    Load { dest: Local, addr: Operand },

    /// Store through a pointer: *addr = src
    Store { src: Operand, addr: Operand },

    /// Address of a local slot or data label: dest = &src
    GetElementPtr { dest: Local, src: Operand },

    /// Copy: dest = value
    Move { dest: Local, value: Operand },

    /// Direct call: dest = func(args...)
    Call {
        dest: Local,
        func: String,
        args: Vec<Operand>,
    },

    /// Return from the function
    Return { value: Option<Operand> },

    /// Branch to `true_label` when `cond` is non-zero, else to `false_label`.
    /// Unconditional when `false_label` is `None`.
    Branch {
        cond: Operand,
        true_label: String,
        false_label: Option<String>,
    },

    /// Declare the stack slot of a local variable
    Alloca { name: Local, symbol: SymbolId },

    /// Fall off the end of the function body
    ProgramEnd,
}

impl IrInstr {
    /// Unconditional branch to `label`
    pub fn jump(label: impl Into<String>) -> Self {
        IrInstr::Branch {
            cond: Operand::Literal(1),
            true_label: label.into(),
            false_label: None,
        }
    }

    /// Get the destination local if this instruction defines one
    pub fn dest(&self) -> Option<&Local> {
        match self {
            IrInstr::Arithmetic { dest, .. }
            | IrInstr::Compare { dest, .. }
            | IrInstr::Load { dest, .. }
            | IrInstr::GetElementPtr { dest, .. }
            | IrInstr::Move { dest, .. }
            | IrInstr::Call { dest, .. } => Some(dest),
            IrInstr::Alloca { name, .. } => Some(name),
            IrInstr::Store { .. }
            | IrInstr::Return { .. }
            | IrInstr::Branch { .. }
            | IrInstr::ProgramEnd => None,
        }
    }

    /// Check if this instruction ends a basic block
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            IrInstr::Branch { .. } | IrInstr::Return { .. } | IrInstr::ProgramEnd
        )
    }

    /// Labels this instruction may transfer control to
    pub fn branch_targets(&self) -> Vec<&str> {
        match self {
            IrInstr::Branch {
                true_label,
                false_label,
                ..
            } => {
                let mut targets = vec![true_label.as_str()];
                if let Some(label) = false_label {
                    targets.push(label.as_str());
                }
                targets
            }
            _ => Vec::new(),
        }
    }

    /// Operands read by this instruction
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            IrInstr::Arithmetic { src1, src2, .. } => vec![src1, src2],
            IrInstr::Compare { op1, op2, .. } => vec![op1, op2],
            IrInstr::Load { addr, .. } => vec![addr],
            IrInstr::Store { src, addr } => vec![src, addr],
            IrInstr::GetElementPtr { src, .. } => vec![src],
            IrInstr::Move { value, .. } => vec![value],
            IrInstr::Call { args, .. } => args.iter().collect(),
            IrInstr::Return { value } => value.iter().collect(),
            IrInstr::Branch { cond, .. } => vec![cond],
            IrInstr::Alloca { .. } | IrInstr::ProgramEnd => Vec::new(),
        }
    }

    /// Does this instruction read `local`
    pub fn reads(&self, local: &Local) -> bool {
        self.operands()
            .into_iter()
            .any(|op| op.as_local() == Some(local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminators() {
        assert!(IrInstr::jump("entry").is_terminator());
        assert!(IrInstr::Return { value: None }.is_terminator());
        assert!(IrInstr::ProgramEnd.is_terminator());
        assert!(!IrInstr::Move {
            dest: Local::Temp(0),
            value: Operand::Literal(1),
        }
        .is_terminator());
    }

    #[test]
    fn test_branch_targets() {
        let br = IrInstr::Branch {
            cond: Operand::temp(1),
            true_label: "if.true.1".to_string(),
            false_label: Some("if.false.2".to_string()),
        };
        assert_eq!(br.branch_targets(), vec!["if.true.1", "if.false.2"]);
        assert_eq!(IrInstr::jump("while.test.1").branch_targets(), vec!["while.test.1"]);
    }

    #[test]
    fn test_reads() {
        let add = IrInstr::Arithmetic {
            dest: Local::Temp(2),
            op: ArithOp::Add,
            src1: Operand::var("x"),
            src2: Operand::temp(1),
        };
        assert!(add.reads(&Local::Temp(1)));
        assert!(add.reads(&Local::var("x")));
        assert!(!add.reads(&Local::Temp(2)));
        assert_eq!(add.dest(), Some(&Local::Temp(2)));
    }
}
