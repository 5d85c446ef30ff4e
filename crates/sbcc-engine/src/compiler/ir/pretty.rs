//! Pretty-printing for IR
//!
//! Renders instructions in the AVM text form, e.g. `%tmp.0= ADD x , #1`.

use super::block::BasicBlock;
use super::function::IrFunction;
use super::instr::IrInstr;
use super::module::IrModule;
use std::fmt;

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl fmt::Display for IrInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrInstr::Arithmetic {
                dest,
                op,
                src1,
                src2,
            } => write!(f, "{}= {} {} , {}", dest, op, src1, src2),
            IrInstr::Compare {
                dest,
                cmp,
                op1,
                op2,
            } => write!(f, "{}= CMP {} {} , {}", dest, cmp, op1, op2),
            IrInstr::Load { dest, addr } => write!(f, "{} = LOAD {}", dest, addr),
            IrInstr::Store { src, addr } => write!(f, "STORE {} , {}", src, addr),
            IrInstr::GetElementPtr { dest, src } => write!(f, "{} = GEP {}", dest, src),
            IrInstr::Move { dest, value } => write!(f, "{} = MV {}", dest, value),
            IrInstr::Call { dest, func, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}= CALL {} ({})", dest, func, args.join(","))
            }
            IrInstr::Return { value: Some(value) } => write!(f, "RET {}", value),
            IrInstr::Return { value: None } => write!(f, "RET"),
            IrInstr::Branch {
                cond,
                true_label,
                false_label,
            } => write!(
                f,
                "BR {} true: {} false: {}",
                cond,
                true_label,
                false_label.as_deref().unwrap_or("NULL")
            ),
            IrInstr::Alloca { name, .. } => write!(f, "ALLOCA {}", name),
            IrInstr::ProgramEnd => write!(f, "END"),
        }
    }
}

impl PrettyPrint for IrModule {
    fn pretty_print(&self) -> String {
        let mut output = String::new();

        for func in &self.functions {
            output.push_str(&func.pretty_print());
            output.push('\n');
        }

        output
    }
}

impl PrettyPrint for IrFunction {
    fn pretty_print(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        let mut output = format!("function {}({}) {{\n", self.name, params.join(", "));

        for block in &self.blocks {
            output.push_str(&block.pretty_print());
        }

        output.push_str("}\n");
        output
    }
}

impl PrettyPrint for BasicBlock {
    fn pretty_print(&self) -> String {
        let mut output = format!("{}:\n", self.label);
        for instr in &self.instructions {
            output.push('\t');
            output.push_str(&instr.to_string());
            output.push('\n');
        }
        output
    }
}
