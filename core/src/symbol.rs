//! Interned word spellings.
//!
//! Every word cell carries a [`Symbol`], a small index into the
//! interpreter-wide [`SymbolTable`]. Comparing two words is an integer
//! comparison; the spelling is only needed for lookup errors and molding.

use ecow::EcoString;
use hashbrown::HashMap;

/// Handle to an interned spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// The `null` keyword; interned first by every table.
    pub const NULL: Symbol = Symbol(0);
    /// The `okay` keyword; interned second by every table.
    pub const OKAY: Symbol = Symbol(1);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Table of interned spellings. Symbols are never freed.
#[derive(Debug)]
pub struct SymbolTable {
    names: Vec<EcoString>,
    index: HashMap<EcoString, Symbol>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = Self {
            names: Vec::new(),
            index: HashMap::new(),
        };
        let null = table.intern("null");
        let okay = table.intern("okay");
        debug_assert_eq!((null, okay), (Symbol::NULL, Symbol::OKAY));
        table
    }

    /// Intern `name`, returning the existing symbol if it was seen before.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(symbol) = self.index.get(name) {
            return *symbol;
        }
        let symbol = Symbol(self.names.len() as u32);
        let name = EcoString::from(name);
        self.names.push(name.clone());
        self.index.insert(name, symbol);
        symbol
    }

    /// Look up a spelling without interning it.
    pub fn find(&self, name: &str) -> Option<Symbol> {
        self.index.get(name).copied()
    }

    pub fn name(&self, symbol: Symbol) -> &str {
        &self.names[symbol.index()]
    }

    /// Cheap clone of a spelling, for error payloads that outlive a borrow.
    pub fn spelling(&self, symbol: Symbol) -> EcoString {
        self.names[symbol.index()].clone()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.intern("append");
        let b = table.intern("append");
        let c = table.intern("insert");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.name(c), "insert");
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_find_does_not_intern() {
        let mut table = SymbolTable::new();
        assert_eq!(table.find("x"), None);
        let x = table.intern("x");
        assert_eq!(table.find("x"), Some(x));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_keywords_are_preinterned() {
        let table = SymbolTable::new();
        assert_eq!(table.name(Symbol::NULL), "null");
        assert_eq!(table.name(Symbol::OKAY), "okay");
    }
}
