//! AST to IR Lowering
//!
//! Converts the checked AST into the IR representation, one function at a
//! time. Statements are lowered in sequence into the current block; if, while
//! and for statements open new blocks and leave the current block positioned
//! at their continuation.

mod control_flow;
mod expr;
mod stmt;

use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{
    BasicBlock, BasicBlockId, IrFunction, IrInstr, IrModule, Local, Operand,
};
use crate::parser::ast::FunctionDef;
use crate::parser::{CType, Program, SymbolId, SymbolTable};
use rustc_hash::FxHashMap;

/// Result of lowering one statement or expression
#[derive(Debug, Clone, PartialEq)]
pub enum Lowered {
    /// The operand holding the value
    Value(Operand),
    /// Lowered inline, no value
    Unit,
    /// A control construct; [`Lowerer::lower_control`] takes over
    Control,
}

/// Lower every function definition of a program into an [`IrModule`].
///
/// The module owns a copy of the program's symbol table, extended with the
/// string literals the functions reference.
pub fn lower_program(program: &Program) -> CompileResult<IrModule> {
    let mut symbols = program.symbols.clone();
    let mut functions = Vec::new();

    for def in program.functions() {
        functions.push(Lowerer::lower_function(def, &mut symbols)?);
    }

    let mut module = IrModule::new(symbols);
    for func in functions {
        module.add_function(func);
    }
    log::debug!("lowered {} functions", module.function_count());
    Ok(module)
}

/// Per-function lowering state
pub struct Lowerer<'a> {
    /// Global symbol table; string literals are appended to it
    symbols: &'a mut SymbolTable,
    /// Function being built
    func: IrFunction,
    /// Block receiving new instructions
    current_block: BasicBlockId,
    next_block: u32,
    next_temp: u32,
    /// Suffix counter shared by every generated block label
    next_label: u32,
    /// IR name of each parameter and local symbol
    local_names: FxHashMap<SymbolId, String>,
    /// How many locals have claimed each source name
    name_counts: FxHashMap<String, u32>,
}

impl<'a> Lowerer<'a> {
    /// Lower one function definition.
    pub fn lower_function(
        def: &FunctionDef,
        symbols: &'a mut SymbolTable,
    ) -> CompileResult<IrFunction> {
        let return_ty = symbols
            .get(def.symbol)
            .and_then(|s| s.ty.as_function())
            .map(|f| (*f.ret).clone())
            .unwrap_or_else(CType::int);

        let mut lowerer = Lowerer {
            symbols,
            func: IrFunction::new(&def.name, def.symbol, Vec::new(), return_ty),
            current_block: BasicBlockId(0),
            next_block: 0,
            next_temp: 0,
            next_label: 0,
            local_names: FxHashMap::default(),
            name_counts: FxHashMap::default(),
        };

        // Parameters claim their bare names before any local
        for &param in &def.params {
            let name = lowerer.declare_name(param)?;
            lowerer.func.params.push(Local::Var(name));
        }

        let entry = lowerer.add_block("entry");
        lowerer.func.entry_block = entry;

        lowerer.emit_allocas(&def.body.scope.locals)?;
        let statements: Vec<_> = def.body.statements.iter().collect();
        let leaves = lowerer.lower_sequence(&statements)?;
        for leaf in leaves {
            lowerer.terminate(leaf, IrInstr::ProgramEnd)?;
        }

        let func = lowerer.func;
        func.validate()
            .map_err(|message| CompileError::MalformedFunction {
                function: func.name.clone(),
                message,
            })?;
        log::debug!(
            "lowered function {}: {} blocks, {} instructions",
            func.name,
            func.block_count(),
            func.instruction_count()
        );
        Ok(func)
    }

    /// Append a new block with a label and make it current
    fn add_block(&mut self, label: impl Into<String>) -> BasicBlockId {
        let id = BasicBlockId::new(self.next_block);
        self.next_block += 1;
        let block = BasicBlock::with_label(id, label);
        log::trace!("{}: new block {} ({})", self.func.name, block.label, id);
        self.func.add_block(block);
        self.current_block = id;
        id
    }

    /// Generate a fresh block label: `if.true.1`, `while.test.4`, ...
    fn new_label(&mut self, prefix: &str) -> String {
        self.next_label += 1;
        format!("{}.{}", prefix, self.next_label)
    }

    /// Allocate a fresh temporary and register it as a local
    fn new_temp(&mut self) -> Local {
        let temp = Local::Temp(self.next_temp);
        self.next_temp += 1;
        self.func.add_local(temp.clone());
        temp
    }

    /// Give a parameter or local symbol its IR name, `x`, `x.1`, `x.2`, ...
    fn declare_name(&mut self, symbol: SymbolId) -> CompileResult<String> {
        let base = self
            .symbols
            .get(symbol)
            .map(|s| s.name.clone())
            .ok_or_else(|| self.unknown(symbol.to_string()))?;

        let count = self.name_counts.entry(base.clone()).or_insert(0);
        let name = if *count == 0 {
            base
        } else {
            format!("{}.{}", base, count)
        };
        *count += 1;

        self.local_names.insert(symbol, name.clone());
        Ok(name)
    }

    /// IR name previously given to a local symbol
    fn local_name(&self, symbol: SymbolId) -> CompileResult<&str> {
        self.local_names
            .get(&symbol)
            .map(String::as_str)
            .ok_or_else(|| self.unknown(symbol.to_string()))
    }

    fn unknown(&self, operand: String) -> CompileError {
        CompileError::UnknownOperand {
            function: self.func.name.clone(),
            operand,
        }
    }

    fn block_mut(&mut self, id: BasicBlockId) -> CompileResult<&mut BasicBlock> {
        let function = self.func.name.clone();
        self.func
            .get_block_mut(id)
            .ok_or_else(|| CompileError::MalformedFunction {
                function,
                message: format!("block {} does not exist", id),
            })
    }

    /// Add an instruction to the current block
    fn emit(&mut self, instr: IrInstr) -> CompileResult<()> {
        let id = self.current_block;
        self.block_mut(id)?.add_instr(instr);
        Ok(())
    }

    /// Terminate the current block unless it already is
    fn set_terminator(&mut self, term: IrInstr) -> CompileResult<()> {
        let id = self.current_block;
        self.terminate(id, term)
    }

    /// Terminate a block unless it already is
    fn terminate(&mut self, id: BasicBlockId, term: IrInstr) -> CompileResult<()> {
        self.block_mut(id)?.set_terminator(term);
        Ok(())
    }

    /// Check if the current block is terminated
    fn current_block_is_terminated(&self) -> bool {
        self.func
            .get_block(self.current_block)
            .map(|b| b.is_terminated())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::PrettyPrint;
    use crate::parser::Parser;

    fn lower(source: &str) -> IrModule {
        let program = Parser::new(source).unwrap().parse().unwrap();
        lower_program(&program).unwrap()
    }

    #[test]
    fn test_entry_block_first() {
        let module = lower("int main() { return 0; }");
        let main = module.get_function("main").unwrap();
        assert_eq!(main.blocks[0].label, "entry");
        assert_eq!(main.pretty_print(), "function main() {\nentry:\n\tRET #0\n}\n");
    }

    #[test]
    fn test_falling_off_the_end() {
        let module = lower("void f() { }");
        let f = module.get_function("f").unwrap();
        assert_eq!(f.blocks[0].instructions, vec![IrInstr::ProgramEnd]);
    }

    #[test]
    fn test_params_keep_bare_names() {
        let module = lower("int f(int x, int y) { { int x = 2; y = x; } return x; }");
        let f = module.get_function("f").unwrap();
        assert_eq!(f.params, vec![Local::var("x"), Local::var("y")]);
        let text = f.pretty_print();
        assert!(text.contains("ALLOCA x.1"), "{}", text);
        assert!(text.contains("y = MV x.1"), "{}", text);
        assert!(text.contains("RET x\n"), "{}", text);
    }

    #[test]
    fn test_prototypes_are_not_lowered() {
        let module = lower("int g(int a); int main() { return g(1); }");
        assert_eq!(module.function_count(), 1);
    }
}
