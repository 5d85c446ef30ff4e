//! IR Module
//!
//! Top-level container for a compilation unit: the lowered functions plus
//! the global symbol table they refer to.

use super::function::IrFunction;
use crate::parser::SymbolTable;
use rustc_hash::FxHashMap;

/// An IR module (compilation unit)
#[derive(Debug, Clone)]
pub struct IrModule {
    /// Functions in source order
    pub functions: Vec<IrFunction>,
    /// Global symbols, including string literals synthesized by lowering
    pub symbols: SymbolTable,
    /// Function lookup by name
    function_map: FxHashMap<String, usize>,
}

impl IrModule {
    /// Create a new module over a symbol table
    pub fn new(symbols: SymbolTable) -> Self {
        Self {
            functions: Vec::new(),
            symbols,
            function_map: FxHashMap::default(),
        }
    }

    /// Add a function to the module
    pub fn add_function(&mut self, func: IrFunction) {
        self.function_map
            .insert(func.name.clone(), self.functions.len());
        self.functions.push(func);
    }

    /// Get a function by name
    pub fn get_function(&self, name: &str) -> Option<&IrFunction> {
        self.function_map
            .get(name)
            .and_then(|&idx| self.functions.get(idx))
    }

    /// Get the number of functions
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CType, SymbolId};

    #[test]
    fn test_module_lookup() {
        let mut module = IrModule::new(SymbolTable::new());
        module.add_function(IrFunction::new("main", SymbolId(0), vec![], CType::int()));
        module.add_function(IrFunction::new("helper", SymbolId(1), vec![], CType::int()));

        assert_eq!(module.function_count(), 2);
        assert_eq!(module.get_function("helper").unwrap().symbol, SymbolId(1));
        assert!(module.get_function("missing").is_none());
    }
}
