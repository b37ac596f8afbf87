//! Fixed-size value cells.
//!
//! A [`Cell`] is a [`Payload`] plus a [`Lift`] byte. Cells are `Copy`:
//! assigning one shares whatever series its payload references, and a
//! cell is never destroyed on its own. Series are reclaimed by the
//! collector once no root reaches them.
//!
//! Three wrappers restrict which lifts a location may hold:
//!
//! - [`Element`]: never an antiform. The only thing arrays store.
//! - [`Value`]: may be a stable antiform (null, okay, trash, action).
//!   Variables and arguments hold these.
//! - [`Atom`]: anything, including the unstable antiforms (pack, ghost,
//!   raised). Only a level's scratch cells and a call's direct result.
//!
//! Widening is free through `From`. Narrowing goes through
//! [`Atom::lift`], [`Value::as_element`] or the heap's `decay`.

pub mod kind;

use core::num::NonZeroU8;
use core::ops::Deref;

use static_assertions::const_assert;

pub use kind::{Kind, TypeSet};

use crate::heap::SeriesId;
use crate::symbol::Symbol;

/// Context a word or list resolves through; `None` means unbound.
pub type Binding = Option<SeriesId>;

/// Series holding a phase's [`Details`](crate::phase::Details).
pub type PhaseId = SeriesId;

/// Series holding a [`Varlist`](crate::context::Varlist).
pub type ContextId = SeriesId;

/// Quoting level of a cell, packed in one byte.
///
/// `0` is the antiform, `1` plain, `2` quasi. Every further quote adds
/// two, so odd values are quoted plain forms and even values above two
/// are quoted quasiforms. Lifting is always "+2" and unlifting "-2".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Lift(u8);

impl Lift {
    pub const ANTIFORM: Lift = Lift(0);
    pub const PLAIN: Lift = Lift(1);
    pub const QUASI: Lift = Lift(2);

    /// A form quoted `depth` times.
    pub fn quoted(depth: NonZeroU8, quasi: bool) -> Option<Lift> {
        let base = if quasi { 2u8 } else { 1 };
        depth.get().checked_mul(2)?.checked_add(base).map(Lift)
    }

    #[inline]
    pub fn is_antiform(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_plain(self) -> bool {
        self.0 == 1
    }

    /// Quasi, at any quote depth.
    #[inline]
    pub fn is_quasi(self) -> bool {
        self.0 != 0 && self.0 % 2 == 0
    }

    #[inline]
    pub fn quote_depth(self) -> u8 {
        self.0.saturating_sub(1) / 2
    }

    fn raised(self) -> Option<Lift> {
        self.0.checked_add(2).map(Lift)
    }

    fn lowered(self) -> Option<Lift> {
        if self.0 < 2 { None } else { Some(Lift(self.0 - 2)) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sigil {
    Plain,
    Set,
    Get,
    Meta,
    The,
    Refine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Block,
    Group,
    Path,
}

/// Payload of a cell. Anything larger than a few words lives in a series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payload {
    Blank,
    Comma,
    Integer(i64),
    Decimal(f64),
    Text(SeriesId),
    Tag(SeriesId),
    Word {
        symbol: Symbol,
        sigil: Sigil,
        binding: Binding,
    },
    List {
        kind: ListKind,
        series: SeriesId,
        index: u32,
        binding: Binding,
    },
    /// A phase identity. The antiform is an action.
    Frame {
        phase: PhaseId,
        coupling: Binding,
        infix: bool,
    },
    Error(SeriesId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    payload: Payload,
    lift: Lift,
}

const_assert!(core::mem::size_of::<Cell>() <= 24);

impl Cell {
    #[inline]
    const fn new(payload: Payload, lift: Lift) -> Cell {
        Cell { payload, lift }
    }

    #[inline]
    pub fn payload(&self) -> Payload {
        self.payload
    }

    #[inline]
    pub fn lift(&self) -> Lift {
        self.lift
    }

    pub fn kind(&self) -> Kind {
        Kind::of(&self.payload)
    }

    #[inline]
    pub fn is_antiform(&self) -> bool {
        self.lift.is_antiform()
    }

    /// Plain form, unquoted and not quasi.
    #[inline]
    pub fn is_plain(&self) -> bool {
        self.lift.is_plain()
    }

    fn is_antiform_of(&self, test: impl FnOnce(&Payload) -> bool) -> bool {
        self.lift.is_antiform() && test(&self.payload)
    }

    pub fn is_null(&self) -> bool {
        self.is_antiform_of(|p| matches!(p, Payload::Word { symbol, .. } if *symbol == Symbol::NULL))
    }

    pub fn is_okay(&self) -> bool {
        self.is_antiform_of(|p| matches!(p, Payload::Word { symbol, .. } if *symbol == Symbol::OKAY))
    }

    pub fn is_trash(&self) -> bool {
        self.is_antiform_of(|p| matches!(p, Payload::Blank))
    }

    pub fn is_ghost(&self) -> bool {
        self.is_antiform_of(|p| matches!(p, Payload::Comma))
    }

    pub fn is_pack(&self) -> bool {
        self.is_antiform_of(|p| matches!(p, Payload::List { .. }))
    }

    pub fn is_raised(&self) -> bool {
        self.is_antiform_of(|p| matches!(p, Payload::Error(_)))
    }

    pub fn is_action(&self) -> bool {
        self.is_antiform_of(|p| matches!(p, Payload::Frame { .. }))
    }

    /// Pack, ghost or raised: may not be stored in a variable.
    pub fn is_unstable(&self) -> bool {
        self.is_pack() || self.is_ghost() || self.is_raised()
    }

    pub fn is_comma(&self) -> bool {
        self.lift.is_plain() && matches!(self.payload, Payload::Comma)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.payload {
            Payload::Integer(n) if self.is_plain() => Some(n),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self.payload {
            Payload::Decimal(d) if self.is_plain() => Some(d),
            _ => None,
        }
    }

    /// Symbol of a plain word with the given sigil.
    pub fn as_word(&self, sigil: Sigil) -> Option<Symbol> {
        match self.payload {
            Payload::Word { symbol, sigil: s, .. } if self.is_plain() && s == sigil => Some(symbol),
            _ => None,
        }
    }

    /// Symbol of any word, whatever its sigil or lift.
    pub fn word_symbol(&self) -> Option<Symbol> {
        match self.payload {
            Payload::Word { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    pub fn as_list(&self, kind: ListKind) -> Option<(SeriesId, u32)> {
        match self.payload {
            Payload::List { kind: k, series, index, .. } if self.is_plain() && k == kind => {
                Some((series, index))
            }
            _ => None,
        }
    }

    /// Phase, coupling and infix flag of an action antiform.
    pub fn as_action(&self) -> Option<(PhaseId, Binding, bool)> {
        match self.payload {
            Payload::Frame { phase, coupling, infix } if self.is_antiform() => {
                Some((phase, coupling, infix))
            }
            _ => None,
        }
    }

    /// Series backing a text, tag, list, error or frame payload.
    pub fn series(&self) -> Option<SeriesId> {
        match self.payload {
            Payload::Text(id) | Payload::Tag(id) | Payload::Error(id) => Some(id),
            Payload::List { series, .. } => Some(series),
            Payload::Frame { phase, .. } => Some(phase),
            _ => None,
        }
    }

    pub fn binding(&self) -> Binding {
        match self.payload {
            Payload::Word { binding, .. } | Payload::List { binding, .. } => binding,
            Payload::Frame { coupling, .. } => coupling,
            _ => None,
        }
    }

    /// Visit every series this cell keeps alive.
    pub(crate) fn each_series(&self, mut visit: impl FnMut(SeriesId)) {
        if let Some(id) = self.series() {
            visit(id);
        }
        if let Some(id) = self.binding() {
            visit(id);
        }
    }

    fn can_be_antiform(payload: &Payload) -> bool {
        match payload {
            Payload::Word { sigil, .. } => *sigil == Sigil::Plain,
            Payload::List { kind, .. } => *kind == ListKind::Block,
            Payload::Blank | Payload::Comma | Payload::Frame { .. } | Payload::Error(_) => true,
            _ => false,
        }
    }
}

/// A cell that is never an antiform.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Element(Cell);

/// A cell that may be a stable antiform.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Value(Cell);

/// Any cell, including unstable antiforms.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Atom(Cell);

macro_rules! deref_to_cell {
    ($($ty:ty),*) => {$(
        impl Deref for $ty {
            type Target = Cell;

            #[inline]
            fn deref(&self) -> &Cell {
                &self.0
            }
        }
    )*};
}

deref_to_cell!(Element, Value, Atom);

impl Element {
    #[inline]
    const fn plain(payload: Payload) -> Element {
        Element(Cell::new(payload, Lift::PLAIN))
    }

    pub const fn blank() -> Element {
        Self::plain(Payload::Blank)
    }

    pub const fn comma() -> Element {
        Self::plain(Payload::Comma)
    }

    pub const fn integer(n: i64) -> Element {
        Self::plain(Payload::Integer(n))
    }

    pub const fn decimal(d: f64) -> Element {
        Self::plain(Payload::Decimal(d))
    }

    pub const fn text(series: SeriesId) -> Element {
        Self::plain(Payload::Text(series))
    }

    pub const fn tag(series: SeriesId) -> Element {
        Self::plain(Payload::Tag(series))
    }

    pub const fn word(symbol: Symbol) -> Element {
        Self::word_with(symbol, Sigil::Plain)
    }

    pub const fn word_with(symbol: Symbol, sigil: Sigil) -> Element {
        Self::plain(Payload::Word { symbol, sigil, binding: None })
    }

    pub const fn list(kind: ListKind, series: SeriesId) -> Element {
        Self::list_at(kind, series, 0)
    }

    pub const fn list_at(kind: ListKind, series: SeriesId, index: u32) -> Element {
        Self::plain(Payload::List { kind, series, index, binding: None })
    }

    pub const fn frame(phase: PhaseId) -> Element {
        Self::plain(Payload::Frame { phase, coupling: None, infix: false })
    }

    pub const fn error(series: SeriesId) -> Element {
        Self::plain(Payload::Error(series))
    }

    /// Quasiform of a plain element, e.g. `~null~` for the word `null`.
    pub fn quasi(self) -> Option<Element> {
        self.0.lift.is_plain().then_some(Element(Cell::new(self.0.payload, Lift::QUASI)))
    }

    /// Add one quote level.
    pub fn quote(self) -> Option<Element> {
        self.0.lift.raised().map(|lift| Element(Cell::new(self.0.payload, lift)))
    }

    /// Remove one quote level, or `None` if not quoted.
    pub fn unquote(self) -> Option<Element> {
        if self.0.lift.quote_depth() == 0 {
            return None;
        }
        self.0.lift.lowered().map(|lift| Element(Cell::new(self.0.payload, lift)))
    }

    /// Inverse of [`Atom::lift`]: quasi becomes antiform, quoted loses a
    /// level. `None` for plain forms and for quasiforms with no antiform.
    pub fn unlift(self) -> Option<Atom> {
        let lift = self.0.lift.lowered()?;
        if lift.is_antiform() && !Cell::can_be_antiform(&self.0.payload) {
            return None;
        }
        Some(Atom(Cell::new(self.0.payload, lift)))
    }

    /// Attach `binding` if the element is an unbound word or list.
    pub fn bound(self, binding: Binding) -> Element {
        let mut cell = self.0;
        match &mut cell.payload {
            Payload::Word { binding: b @ None, .. } | Payload::List { binding: b @ None, .. } => {
                *b = binding;
            }
            _ => {}
        }
        Element(cell)
    }

    /// Replace the binding outright, for words and lists.
    pub fn rebound(self, binding: Binding) -> Element {
        let mut cell = self.0;
        match &mut cell.payload {
            Payload::Word { binding: b, .. } | Payload::List { binding: b, .. } => *b = binding,
            _ => {}
        }
        Element(cell)
    }

    /// Same list at another position.
    pub fn at_index(self, index: u32) -> Element {
        let mut cell = self.0;
        if let Payload::List { index: i, .. } = &mut cell.payload {
            *i = index;
        }
        Element(cell)
    }

    /// Reinterpret an arbitrary cell, refusing antiforms.
    pub fn from_cell(cell: Cell) -> Option<Element> {
        (!cell.is_antiform()).then_some(Element(cell))
    }
}

impl Value {
    const fn antiform(payload: Payload) -> Value {
        Value(Cell::new(payload, Lift::ANTIFORM))
    }

    pub const fn null() -> Value {
        Self::keyword(Symbol::NULL)
    }

    pub const fn okay() -> Value {
        Self::keyword(Symbol::OKAY)
    }

    pub const fn logic(flag: bool) -> Value {
        if flag { Self::okay() } else { Self::null() }
    }

    pub const fn keyword(symbol: Symbol) -> Value {
        Self::antiform(Payload::Word { symbol, sigil: Sigil::Plain, binding: None })
    }

    pub const fn trash() -> Value {
        Self::antiform(Payload::Blank)
    }

    pub const fn action(phase: PhaseId, coupling: Binding, infix: bool) -> Value {
        Self::antiform(Payload::Frame { phase, coupling, infix })
    }

    pub fn integer(n: i64) -> Value {
        Element::integer(n).into()
    }

    pub fn decimal(d: f64) -> Value {
        Element::decimal(d).into()
    }

    /// Everything but null is truthy.
    pub fn is_truthy(&self) -> bool {
        !self.0.is_null()
    }

    pub fn as_element(self) -> Option<Element> {
        Element::from_cell(self.0)
    }
}

impl Atom {
    pub const fn ghost() -> Atom {
        Atom(Cell::new(Payload::Comma, Lift::ANTIFORM))
    }

    pub const fn pack(series: SeriesId) -> Atom {
        Atom(Cell::new(
            Payload::List {
                kind: ListKind::Block,
                series,
                index: 0,
                binding: None,
            },
            Lift::ANTIFORM,
        ))
    }

    pub const fn raised(series: SeriesId) -> Atom {
        Atom(Cell::new(Payload::Error(series), Lift::ANTIFORM))
    }

    /// Element representation: antiform becomes quasi, anything else
    /// gains a quote level. `None` only past the deepest quote level.
    pub fn lift(self) -> Option<Element> {
        self.0.lift.raised().map(|lift| Element(Cell::new(self.0.payload, lift)))
    }

    /// Stable forms pass through, unstable ones need the heap to decay.
    pub fn as_value(self) -> Option<Value> {
        (!self.0.is_unstable()).then_some(Value(self.0))
    }

    pub fn as_element(self) -> Option<Element> {
        Element::from_cell(self.0)
    }
}

impl From<Element> for Value {
    #[inline]
    fn from(element: Element) -> Value {
        Value(element.0)
    }
}

impl From<Element> for Atom {
    #[inline]
    fn from(element: Element) -> Atom {
        Atom(element.0)
    }
}

impl From<Value> for Atom {
    #[inline]
    fn from(value: Value) -> Atom {
        Atom(value.0)
    }
}

#[cfg(test)]
mod cell_test;
