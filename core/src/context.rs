//! Variable storage and word lookup.
//!
//! A [`Varlist`] is a context: keys, one value per key, and a parent
//! binding. Frames use their phase's parameter list as keys; modules
//! (`lib`, `user`) and loop scopes keep their own symbol map.

use std::rc::Rc;

use hashbrown::HashMap;

use crate::cell::{Binding, ContextId, Value};
use crate::error::crash;
use crate::heap::Heap;
use crate::phase::{ParamClass, ParamList};
use crate::symbol::Symbol;

#[derive(Debug, Default, Clone)]
pub struct SymbolMap {
    symbols: Vec<Symbol>,
    index: HashMap<Symbol, usize>,
}

impl SymbolMap {
    fn find(&self, symbol: Symbol) -> Option<usize> {
        self.index.get(&symbol).copied()
    }

    fn insert(&mut self, symbol: Symbol) -> usize {
        let slot = self.symbols.len();
        self.symbols.push(symbol);
        self.index.insert(symbol, slot);
        slot
    }
}

#[derive(Debug, Clone)]
pub enum Keys {
    Frame(Rc<ParamList>),
    Symbols(SymbolMap),
}

/// Which frame slots lookup can see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lens {
    All,
    /// Parameters only, hiding locals (adaptation preludes).
    Inputs,
}

#[derive(Debug, Clone)]
pub struct Varlist {
    pub keys: Keys,
    pub vars: Vec<Value>,
    pub parent: Binding,
    pub lens: Lens,
    /// Set-words that reach a module define into it.
    pub module: bool,
}

impl Varlist {
    pub fn module(parent: Binding) -> Self {
        Self {
            keys: Keys::Symbols(SymbolMap::default()),
            vars: Vec::new(),
            parent,
            lens: Lens::All,
            module: true,
        }
    }

    /// Non-module scope over fixed symbols, e.g. a loop variable.
    pub fn scope(symbols: &[Symbol], parent: Binding) -> Self {
        let mut map = SymbolMap::default();
        for symbol in symbols {
            map.insert(*symbol);
        }
        Self {
            keys: Keys::Symbols(map),
            vars: vec![Value::null(); symbols.len()],
            parent,
            lens: Lens::All,
            module: false,
        }
    }

    /// Frame with every slot null.
    pub fn frame(params: Rc<ParamList>) -> Self {
        let len = params.params.len();
        Self {
            keys: Keys::Frame(params),
            vars: vec![Value::null(); len],
            parent: None,
            lens: Lens::All,
            module: false,
        }
    }

    pub fn find(&self, symbol: Symbol) -> Option<usize> {
        match &self.keys {
            Keys::Symbols(map) => map.find(symbol),
            Keys::Frame(params) => params.params.iter().position(|param| {
                param.symbol == symbol
                    && (self.lens == Lens::All || param.class != ParamClass::Local)
            }),
        }
    }

    pub fn symbol_at(&self, slot: usize) -> Symbol {
        match &self.keys {
            Keys::Symbols(map) => map.symbols[slot],
            Keys::Frame(params) => params.params[slot].symbol,
        }
    }

    /// Assign `symbol`, adding a key if it is new.
    pub fn define(&mut self, symbol: Symbol, value: Value) -> usize {
        let Keys::Symbols(map) = &mut self.keys else {
            crash("cannot add keys to a frame");
        };
        let slot = match map.find(symbol) {
            Some(slot) => slot,
            None => {
                self.vars.push(Value::null());
                map.insert(symbol)
            }
        };
        self.vars[slot] = value;
        slot
    }

    pub fn params(&self) -> Option<&Rc<ParamList>> {
        match &self.keys {
            Keys::Frame(params) => Some(params),
            Keys::Symbols(_) => None,
        }
    }
}

/// Walk the binding chain for `symbol`.
pub fn lookup(heap: &Heap, symbol: Symbol, binding: Binding) -> Option<(ContextId, usize)> {
    let mut context = binding;
    while let Some(id) = context {
        let varlist = heap.varlist(id);
        if let Some(slot) = varlist.find(symbol) {
            return Some((id, slot));
        }
        context = varlist.parent;
    }
    None
}

/// Where a set-word writes: the nearest frame or scope that has the key,
/// otherwise the first module on the chain (slot `None` if it must be
/// defined there).
pub fn resolve_for_set(
    heap: &Heap,
    symbol: Symbol,
    binding: Binding,
) -> Option<(ContextId, Option<usize>)> {
    let mut context = binding;
    while let Some(id) = context {
        let varlist = heap.varlist(id);
        let slot = varlist.find(symbol);
        if varlist.module {
            return Some((id, slot));
        }
        if slot.is_some() {
            return Some((id, slot));
        }
        context = varlist.parent;
    }
    None
}
