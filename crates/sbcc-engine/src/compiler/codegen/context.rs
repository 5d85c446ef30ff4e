//! Code Generator Context
//!
//! Manages state during assembly generation from IR.

use super::emit::{
    add_sub_immediate, arith_mnemonic, block_label, condition, escape_asciz, load_immediate,
    MAX_SCALED_OFFSET,
};
use super::frame::{FrameLayout, MAX_REGISTER_ARGS};
use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{BasicBlock, IrFunction, IrInstr, IrModule, Local, Operand};
use crate::parser::{SymbolKind, SymbolTable};
use std::fmt::Write;

/// Registers handed out for operand fetches, recycled after every
/// instruction
const SCRATCH_REGISTERS: [&str; 4] = ["x9", "x10", "x11", "x12"];

/// Base register for slots past the scaled `ldr`/`str` offset range
const SLOT_BASE_REGISTER: &str = "x16";

/// Code generator that transforms IR to AArch64 assembly text
pub struct AsmGenerator {
    output: String,
}

/// Context for compiling a single function
struct FunctionContext<'a> {
    func: &'a IrFunction,
    symbols: &'a SymbolTable,
    frame: FrameLayout,
    /// Next free index into `SCRATCH_REGISTERS`
    next_scratch: usize,
    body: String,
}

impl AsmGenerator {
    /// Create a new code generator
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Generate assembly for an IR module.
    ///
    /// The first failing function aborts the whole module.
    pub fn generate(&mut self, module: &IrModule) -> CompileResult<String> {
        self.generate_data(&module.symbols);

        self.output.push_str(".text\n");
        for func in &module.functions {
            self.line(format!(".globl {}", func.name));
        }

        for func in &module.functions {
            let body = self.generate_function(func, &module.symbols)?;
            self.output.push_str(&body);
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn line(&mut self, text: String) {
        self.output.push_str(&text);
        self.output.push('\n');
    }

    /// Globals in symbol order: numbers and pointers get an initialized
    /// quad, string literals their bytes
    fn generate_data(&mut self, symbols: &SymbolTable) {
        self.output.push_str(".data\n");
        for (_, symbol) in symbols.iter() {
            match symbol.kind {
                SymbolKind::Variable => {
                    self.line(".balign 8".to_string());
                    self.line(format!("{}:", symbol.name));
                    self.line(format!("\t.quad {}", symbol.value));
                }
                SymbolKind::StringLiteral => {
                    let text = symbol.literal.as_deref().unwrap_or_default();
                    self.line(format!("{}:", symbol.name));
                    self.line(format!("\t.asciz {}", escape_asciz(text)));
                }
                SymbolKind::Function | SymbolKind::Local | SymbolKind::Parameter => {}
            }
        }
    }

    /// Generate assembly for a single function
    fn generate_function(&self, func: &IrFunction, symbols: &SymbolTable) -> CompileResult<String> {
        let frame = FrameLayout::compute(func)?;
        log::debug!(
            "codegen {}: {} slots, {} byte frame",
            func.name,
            frame.slot_count(),
            frame.frame_size()
        );

        let mut ctx = FunctionContext {
            func,
            symbols,
            frame,
            next_scratch: 0,
            body: String::new(),
        };

        ctx.label(&func.name);
        ctx.emit_prologue()?;
        for block in func.blocks() {
            ctx.generate_block(block)?;
        }
        ctx.label(&block_label(&func.name, "exit"));
        ctx.emit_epilogue();

        Ok(ctx.body)
    }
}

impl Default for AsmGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FunctionContext<'a> {
    /// Emit one tab-prefixed instruction line
    fn emit(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.body, "\t{}", text.as_ref());
    }

    fn label(&mut self, label: &str) {
        let _ = writeln!(self.body, "{}:", label);
    }

    fn emit_prologue(&mut self) -> CompileResult<()> {
        self.emit("stp x29, x30, [sp, #-16]!");
        self.emit("mov x29, sp");
        self.adjust_sp("sub");

        // Incoming arguments arrive in x0..x7
        let func = self.func;
        for (i, param) in func.params.iter().enumerate() {
            let slot = self.slot_address(param)?;
            self.emit(format!("str x{}, {}", i, slot));
        }
        Ok(())
    }

    fn emit_epilogue(&mut self) {
        self.adjust_sp("add");
        self.emit("ldp x29, x30, [sp], #16");
        self.emit("ret");
    }

    /// Move `sp` across the slot storage
    fn adjust_sp(&mut self, mnemonic: &str) {
        if self.frame.stack_size() > 0 {
            for line in add_sub_immediate(mnemonic, "sp", "sp", self.frame.stack_size()) {
                self.emit(line);
            }
        }
    }

    fn generate_block(&mut self, block: &BasicBlock) -> CompileResult<()> {
        self.label(&block_label(&self.func.name, &block.label));
        for instr in &block.instructions {
            self.generate_instr(instr)?;
            self.next_scratch = 0;
        }
        Ok(())
    }

    /// Take the next scratch register
    fn acquire(&mut self) -> CompileResult<&'static str> {
        let reg = SCRATCH_REGISTERS.get(self.next_scratch).copied().ok_or_else(|| {
            CompileError::MalformedFunction {
                function: self.func.name.clone(),
                message: "scratch registers exhausted".to_string(),
            }
        })?;
        self.next_scratch += 1;
        Ok(reg)
    }

    /// Stack offset of a local
    fn slot(&self, local: &Local) -> CompileResult<usize> {
        self.frame
            .offset(local)
            .ok_or_else(|| CompileError::UnknownOperand {
                function: self.func.name.clone(),
                operand: local.to_string(),
            })
    }

    /// Memory operand of a local's slot. A slot past the scaled offset range
    /// is reached through `x16`, set up here.
    fn slot_address(&mut self, local: &Local) -> CompileResult<String> {
        let offset = self.slot(local)?;
        if offset <= MAX_SCALED_OFFSET {
            return Ok(format!("[sp, #{}]", offset));
        }
        self.emit(format!("add {}, sp, #{}, lsl #12", SLOT_BASE_REGISTER, offset >> 12));
        Ok(format!("[{}, #{}]", SLOT_BASE_REGISTER, offset & 0xfff))
    }

    /// Fetch an operand's value into a fresh scratch register
    fn fetch(&mut self, operand: &Operand) -> CompileResult<&'static str> {
        let reg = self.acquire()?;
        self.load_into(reg, operand)?;
        Ok(reg)
    }

    fn load_into(&mut self, reg: &str, operand: &Operand) -> CompileResult<()> {
        match operand {
            Operand::Literal(value) => self.emit(load_immediate(reg, *value)),
            Operand::Global(name) => {
                self.emit(format!("ldr {}, ={}", reg, name));
                self.emit(format!("ldr {}, [{}]", reg, reg));
            }
            Operand::Label(name) => self.emit(format!("ldr {}, ={}", reg, name)),
            Operand::Local(local) => {
                let slot = self.slot_address(local)?;
                self.emit(format!("ldr {}, {}", reg, slot));
            }
        }
        Ok(())
    }

    /// Store a register to a local's slot
    fn store(&mut self, reg: &str, dest: &Local) -> CompileResult<()> {
        let slot = self.slot_address(dest)?;
        self.emit(format!("str {}, {}", reg, slot));
        Ok(())
    }

    /// Generate assembly for an instruction
    fn generate_instr(&mut self, instr: &IrInstr) -> CompileResult<()> {
        match instr {
            IrInstr::Arithmetic {
                dest,
                op,
                src1,
                src2,
            } => {
                let mnemonic = arith_mnemonic(*op)?;
                let a = self.fetch(src1)?;
                let b = self.fetch(src2)?;
                let d = self.acquire()?;
                self.emit(format!("{} {}, {}, {}", mnemonic, d, a, b));
                self.store(d, dest)
            }

            IrInstr::Compare {
                dest,
                cmp,
                op1,
                op2,
            } => {
                let a = self.fetch(op1)?;
                let b = self.fetch(op2)?;
                let d = self.acquire()?;
                self.emit(format!("cmp {}, {}", a, b));
                self.emit(format!("csetm {}, {}", d, condition(*cmp)));
                self.store(d, dest)
            }

            IrInstr::Load { dest, addr } => {
                let a = self.fetch(addr)?;
                let d = self.acquire()?;
                self.emit(format!("ldr {}, [{}]", d, a));
                self.store(d, dest)
            }

            IrInstr::Store { src, addr } => {
                let s = self.fetch(src)?;
                let a = self.fetch(addr)?;
                self.emit(format!("str {}, [{}]", s, a));
                Ok(())
            }

            IrInstr::GetElementPtr { dest, src } => {
                let d = self.acquire()?;
                match src {
                    Operand::Local(local) => {
                        let offset = self.slot(local)?;
                        for line in add_sub_immediate("add", d, "sp", offset) {
                            self.emit(line);
                        }
                    }
                    other => self.load_into(d, other)?,
                }
                self.store(d, dest)
            }

            IrInstr::Move { dest, value } => {
                let r = self.fetch(value)?;
                self.store(r, dest)
            }

            IrInstr::Call { dest, func, args } => {
                if args.len() > MAX_REGISTER_ARGS {
                    return Err(CompileError::TooManyArguments {
                        callee: func.clone(),
                        count: args.len(),
                    });
                }
                for (i, arg) in args.iter().enumerate() {
                    self.load_into(&format!("x{}", i), arg)?;
                }
                self.emit(format!("bl {}", func));
                self.store("x0", dest)
            }

            IrInstr::Return { value } => {
                if let Some(value) = value {
                    let r = self.fetch(value)?;
                    self.emit(format!("mov x0, {}", r));
                }
                self.emit_epilogue();
                Ok(())
            }

            IrInstr::Branch {
                cond,
                true_label,
                false_label,
            } => {
                if let Some(false_label) = false_label {
                    let c = self.fetch(cond)?;
                    self.emit(format!("cmp {}, #0", c));
                    self.emit(format!("b.eq {}", block_label(&self.func.name, false_label)));
                }
                self.emit(format!("b {}", block_label(&self.func.name, true_label)));
                Ok(())
            }

            IrInstr::Alloca { name, symbol } => {
                let value = self
                    .symbols
                    .get(*symbol)
                    .map(|s| s.value)
                    .ok_or_else(|| CompileError::MalformedFunction {
                        function: self.func.name.clone(),
                        message: format!("alloca of {} names no symbol", name),
                    })?;
                let r = self.acquire()?;
                self.emit(load_immediate(r, value));
                self.store(r, name)
            }

            IrInstr::ProgramEnd => {
                self.emit(format!("b {}", block_label(&self.func.name, "exit")));
                Ok(())
            }
        }
    }
}
