//! Symbol table shared by the front end and the compiler core.
//!
//! The table is an append-only list: a [`SymbolId`] stays valid for the whole
//! compilation, including after the compiler appends synthesized string
//! literal globals.

use std::fmt;

/// Index of a symbol in the [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym{}", self.0)
    }
}

/// Width of an integer scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntKind {
    Char,
    Short,
    Int,
    Long,
}

/// Prototype of a function: its parameter symbols and return type.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub params: Vec<SymbolId>,
    pub ret: Box<CType>,
}

/// Type descriptor of the C subset.
#[derive(Debug, Clone, PartialEq)]
pub enum CType {
    Void,
    Integer { kind: IntKind, unsigned: bool },
    Pointer(Box<CType>),
    Function(FunctionType),
}

impl CType {
    /// Plain `int`.
    pub fn int() -> Self {
        CType::Integer {
            kind: IntKind::Int,
            unsigned: false,
        }
    }

    /// `char *`, the type of string literals.
    pub fn char_ptr() -> Self {
        CType::Pointer(Box::new(CType::Integer {
            kind: IntKind::Char,
            unsigned: false,
        }))
    }

    /// Integer scalar stored in a register-sized slot.
    pub fn is_num_var(&self) -> bool {
        matches!(self, CType::Integer { .. })
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, CType::Pointer(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, CType::Function(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, CType::Void)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, CType::Integer { unsigned: true, .. })
    }

    /// Type obtained by dereferencing a pointer.
    pub fn pointee(&self) -> Option<&CType> {
        match self {
            CType::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            CType::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Void => write!(f, "void"),
            CType::Integer { kind, unsigned } => {
                if *unsigned {
                    write!(f, "unsigned ")?;
                }
                match kind {
                    IntKind::Char => write!(f, "char"),
                    IntKind::Short => write!(f, "short"),
                    IntKind::Int => write!(f, "int"),
                    IntKind::Long => write!(f, "long"),
                }
            }
            CType::Pointer(inner) => write!(f, "{} *", inner),
            CType::Function(func) => write!(f, "{} (*)({} params)", func.ret, func.params.len()),
        }
    }
}

/// Storage class of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Global variable in the data section
    Variable,
    /// Function (declared or defined)
    Function,
    /// Read-only string literal global
    StringLiteral,
    /// Stack-allocated local variable
    Local,
    /// Incoming function parameter
    Parameter,
}

/// An entry of the symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: CType,
    pub kind: SymbolKind,
    /// Initial value of globals and of literal-initialized locals
    pub value: i64,
    /// Payload of string literal globals
    pub literal: Option<String>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: CType, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
            value: 0,
            literal: None,
        }
    }

    /// Whether this symbol lives in the data section.
    pub fn is_global_data(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable | SymbolKind::StringLiteral)
    }
}

/// Append-only list of every symbol in a compilation unit.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol and return its id.
    pub fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    /// Find a global-scope symbol (variable, function or string literal) by name.
    pub fn lookup_global(&self, name: &str) -> Option<SymbolId> {
        self.iter()
            .find(|(_, s)| {
                s.name == name
                    && matches!(
                        s.kind,
                        SymbolKind::Variable | SymbolKind::Function | SymbolKind::StringLiteral
                    )
            })
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId::new(i as u32), s))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
