//! AArch64 Emission Helpers
//!
//! Mnemonic tables and small text builders shared by the generator.

use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{ArithOp, CmpCode};

/// Largest offset a 64-bit `ldr`/`str` encodes as a scaled immediate
pub const MAX_SCALED_OFFSET: usize = 4095 * 8;

/// Largest unsigned immediate `add`/`sub` reach as a shifted high part plus
/// a low part
pub const MAX_SPLIT_IMMEDIATE: usize = 0xFF_FFFF;

/// Mnemonic of an arithmetic opcode
pub fn arith_mnemonic(op: ArithOp) -> CompileResult<&'static str> {
    let mnemonic = match op {
        ArithOp::Add => "add",
        ArithOp::Sub => "sub",
        ArithOp::Mul => "mul",
        ArithOp::Div => "udiv",
        ArithOp::Sll => "lsl",
        ArithOp::Slr => "lsr",
        ArithOp::Asr => "asr",
        ArithOp::And => "and",
        ArithOp::Orr => "orr",
        ArithOp::Xor => "eor",
        ArithOp::Mod => {
            return Err(CompileError::UnsupportedOpcode {
                opcode: op.name().to_string(),
            })
        }
    };
    Ok(mnemonic)
}

/// Condition code a comparison sets its destination on
pub fn condition(cmp: CmpCode) -> &'static str {
    match cmp {
        CmpCode::Lt => "lt",
        CmpCode::Mt => "gt",
        CmpCode::LtEq => "le",
        CmpCode::MtEq => "ge",
        CmpCode::Eq => "eq",
        CmpCode::Neq => "ne",
    }
}

/// Load `value` into `reg`: a `mov` when it fits one move-wide, otherwise a
/// literal pool load
pub fn load_immediate(reg: &str, value: i64) -> String {
    if (-65536..=65535).contains(&value) {
        format!("mov {}, #{}", reg, value)
    } else {
        format!("ldr {}, ={}", reg, value)
    }
}

/// `add`/`sub` of an unsigned immediate. Values past 12 bits become a
/// `lsl #12` high part followed by the low part, when that is non-zero.
pub fn add_sub_immediate(mnemonic: &str, dest: &str, src: &str, value: usize) -> Vec<String> {
    if value <= 0xfff {
        return vec![format!("{} {}, {}, #{}", mnemonic, dest, src, value)];
    }
    let mut lines = vec![format!("{} {}, {}, #{}, lsl #12", mnemonic, dest, src, value >> 12)];
    if value & 0xfff != 0 {
        lines.push(format!("{} {}, {}, #{}", mnemonic, dest, dest, value & 0xfff));
    }
    lines
}

/// Local assembler label of a block
pub fn block_label(function: &str, label: &str) -> String {
    format!(".L{}.{}", function, label)
}

/// Quote a string for `.asciz`
pub fn escape_asciz(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for byte in value.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{:03o}", byte)),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_has_no_mnemonic() {
        assert_eq!(arith_mnemonic(ArithOp::Div), Ok("udiv"));
        assert_eq!(arith_mnemonic(ArithOp::Xor), Ok("eor"));
        assert_eq!(
            arith_mnemonic(ArithOp::Mod),
            Err(CompileError::UnsupportedOpcode {
                opcode: "MOD".to_string()
            })
        );
    }

    #[test]
    fn test_load_immediate() {
        assert_eq!(load_immediate("x9", 42), "mov x9, #42");
        assert_eq!(load_immediate("x9", -1), "mov x9, #-1");
        assert_eq!(load_immediate("x9", 65536), "ldr x9, =65536");
        assert_eq!(load_immediate("x9", i64::MIN), "ldr x9, =-9223372036854775808");
    }

    #[test]
    fn test_add_sub_immediate_splits_past_twelve_bits() {
        assert_eq!(add_sub_immediate("sub", "sp", "sp", 4080), vec!["sub sp, sp, #4080"]);
        assert_eq!(add_sub_immediate("sub", "sp", "sp", 8192), vec!["sub sp, sp, #2, lsl #12"]);
        assert_eq!(
            add_sub_immediate("add", "x9", "sp", 4800),
            vec!["add x9, sp, #1, lsl #12", "add x9, x9, #704"]
        );
        assert_eq!(
            add_sub_immediate("sub", "sp", "sp", MAX_SPLIT_IMMEDIATE & !0xf),
            vec!["sub sp, sp, #4095, lsl #12", "sub sp, sp, #4080"]
        );
    }

    #[test]
    fn test_escape_asciz() {
        assert_eq!(escape_asciz("hi\n"), "\"hi\\n\"");
        assert_eq!(escape_asciz("a\"b\\"), "\"a\\\"b\\\\\"");
        assert_eq!(escape_asciz("\u{1}"), "\"\\001\"");
    }

    #[test]
    fn test_block_label() {
        assert_eq!(block_label("main", "if.true.1"), ".Lmain.if.true.1");
    }
}
