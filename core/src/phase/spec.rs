//! The parameter-list dialect.
//!
//! ```text
//! [
//!     return: [integer!]      ; result contract
//!     "description"           ; ignored
//!     value [integer! <end>]  ; evaluated, may be missing at end
//!     'word                   ; literal
//!     @word                   ; literal, bound to the call site
//!     :word                   ; literal, groups evaluated
//!     ^atom                   ; evaluated, lifted
//!     /flag                   ; presence flag
//!     /limit [integer!]       ; refinement taking an argument
//!     <local> temp            ; not passed
//! ]
//! ```

use ecow::EcoString;

use super::{Param, ParamClass, ParamList};
use crate::cell::{Element, ListKind, Payload, Sigil, TypeSet};
use crate::error::{Error, ErrorKind};
use crate::heap::{Heap, SeriesId};
use crate::symbol::{Symbol, SymbolTable};

fn bad(message: impl Into<EcoString>) -> Error {
    ErrorKind::BadSpec(message.into()).into()
}

/// Parse a spec block (from `index` on) into a parameter list.
pub fn parse_spec(
    heap: &Heap,
    symbols: &SymbolTable,
    spec: SeriesId,
    index: u32,
) -> Result<ParamList, Error> {
    let items: Vec<Element> = heap.array(spec).iter().skip(index as usize).copied().collect();
    let mut list = ParamList::default();
    let mut locals = false;
    let mut iter = items.into_iter().peekable();

    while let Some(item) = iter.next() {
        let payload = item.payload();
        match payload {
            Payload::Text(_) => continue,
            Payload::Tag(id) => match heap.text(id) {
                "local" => locals = true,
                other => return Err(bad(format!("unknown tag <{}>", other))),
            },
            Payload::Word { symbol, sigil, .. } => {
                let lift = item.lift();
                if sigil == Sigil::Set && lift.is_plain() {
                    if symbols.name(symbol) != "return" {
                        return Err(bad(format!("unexpected {}:", symbols.name(symbol))));
                    }
                    let Some((types, _)) = next_types(heap, symbols, &mut iter)? else {
                        return Err(bad("return: needs a type block"));
                    };
                    list.returns = Some(types);
                    continue;
                }
                if list.index_of(symbol).is_some() {
                    return Err(bad(format!("duplicate parameter {}", symbols.name(symbol))));
                }
                let class = if locals {
                    if !(sigil == Sigil::Plain && lift.is_plain()) {
                        return Err(bad("locals are plain words"));
                    }
                    ParamClass::Local
                } else {
                    class_of(sigil, lift.quote_depth(), lift.is_plain())
                        .ok_or_else(|| bad(format!("bad parameter {}", symbols.name(symbol))))?
                };
                let mut param = Param::new(symbol, class);
                param.refinement = sigil == Sigil::Refine;
                if class != ParamClass::Local {
                    if let Some((types, endable)) = next_types(heap, symbols, &mut iter)? {
                        param.types = Some(types);
                        param.endable = endable;
                    }
                }
                list.params.push(param);
            }
            _ => return Err(bad("spec items are words, text and type blocks")),
        }
    }
    Ok(list)
}

fn class_of(sigil: Sigil, quotes: u8, plain: bool) -> Option<ParamClass> {
    match (sigil, quotes) {
        (Sigil::Plain, 1) => Some(ParamClass::Just),
        (_, 0) if plain => match sigil {
            Sigil::Plain | Sigil::Refine => Some(ParamClass::Normal),
            Sigil::The => Some(ParamClass::The),
            Sigil::Get => Some(ParamClass::Soft),
            Sigil::Meta => Some(ParamClass::Meta),
            Sigil::Set => None,
        },
        _ => None,
    }
}

/// Consume a type block if one comes next.
fn next_types(
    heap: &Heap,
    symbols: &SymbolTable,
    iter: &mut core::iter::Peekable<std::vec::IntoIter<Element>>,
) -> Result<Option<(TypeSet, bool)>, Error> {
    let Some(block) = iter.peek().and_then(|item| item.as_list(ListKind::Block)) else {
        return Ok(None);
    };
    iter.next();
    let (series, index) = block;
    let mut types = TypeSet::empty();
    let mut endable = false;
    for item in heap.array(series).iter().skip(index as usize) {
        match item.payload() {
            Payload::Tag(id) if heap.text(id) == "end" => endable = true,
            Payload::Word { symbol, .. } if item.lift().is_quasi() => {
                types |= keyword_type(symbol).ok_or_else(|| bad("unknown quasi type"))?;
            }
            Payload::Word { symbol, sigil: Sigil::Plain, .. } if item.is_plain() => {
                let name = symbols.name(symbol);
                types |= TypeSet::parse_name(name)
                    .ok_or_else(|| bad(format!("unknown type {}", name)))?;
            }
            Payload::Text(_) => {}
            _ => return Err(bad("type blocks hold type words")),
        }
    }
    if types.is_empty() {
        types = TypeSet::ANY_VALUE;
    }
    Ok(Some((types, endable)))
}

fn keyword_type(symbol: Symbol) -> Option<TypeSet> {
    match symbol {
        Symbol::NULL => Some(TypeSet::NULL),
        Symbol::OKAY => Some(TypeSet::OKAY),
        _ => None,
    }
}

#[cfg(test)]
#[path = "spec_test.rs"]
mod spec_test;
