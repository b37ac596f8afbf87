//! Type tags and type sets.
//!
//! [`Kind`] is the datatype of a plain element. [`TypeSet`] is what
//! parameter type blocks and return contracts compile to: one flag per
//! kind, plus flags for quoting levels and for each antiform.

use bitflags::bitflags;

use super::{Cell, ListKind, Payload, Sigil};
use crate::symbol::Symbol;

/// Datatype of an element, ignoring its lift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Blank,
    Comma,
    Integer,
    Decimal,
    Text,
    Tag,
    Word,
    SetWord,
    GetWord,
    MetaWord,
    TheWord,
    Refinement,
    Block,
    Group,
    Path,
    Frame,
    Error,
}

impl Kind {
    pub fn of(payload: &Payload) -> Kind {
        match payload {
            Payload::Blank => Kind::Blank,
            Payload::Comma => Kind::Comma,
            Payload::Integer(_) => Kind::Integer,
            Payload::Decimal(_) => Kind::Decimal,
            Payload::Text(_) => Kind::Text,
            Payload::Tag(_) => Kind::Tag,
            Payload::Word { sigil, .. } => match sigil {
                Sigil::Plain => Kind::Word,
                Sigil::Set => Kind::SetWord,
                Sigil::Get => Kind::GetWord,
                Sigil::Meta => Kind::MetaWord,
                Sigil::The => Kind::TheWord,
                Sigil::Refine => Kind::Refinement,
            },
            Payload::List { kind, .. } => match kind {
                ListKind::Block => Kind::Block,
                ListKind::Group => Kind::Group,
                ListKind::Path => Kind::Path,
            },
            Payload::Frame { .. } => Kind::Frame,
            Payload::Error(_) => Kind::Error,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Blank => "blank!",
            Kind::Comma => "comma!",
            Kind::Integer => "integer!",
            Kind::Decimal => "decimal!",
            Kind::Text => "text!",
            Kind::Tag => "tag!",
            Kind::Word => "word!",
            Kind::SetWord => "set-word!",
            Kind::GetWord => "get-word!",
            Kind::MetaWord => "meta-word!",
            Kind::TheWord => "the-word!",
            Kind::Refinement => "refinement!",
            Kind::Block => "block!",
            Kind::Group => "group!",
            Kind::Path => "path!",
            Kind::Frame => "frame!",
            Kind::Error => "error!",
        }
    }

    fn flag(self) -> TypeSet {
        match self {
            Kind::Blank => TypeSet::BLANK,
            Kind::Comma => TypeSet::COMMA,
            Kind::Integer => TypeSet::INTEGER,
            Kind::Decimal => TypeSet::DECIMAL,
            Kind::Text => TypeSet::TEXT,
            Kind::Tag => TypeSet::TAG,
            Kind::Word => TypeSet::WORD,
            Kind::SetWord => TypeSet::SET_WORD,
            Kind::GetWord => TypeSet::GET_WORD,
            Kind::MetaWord => TypeSet::META_WORD,
            Kind::TheWord => TypeSet::THE_WORD,
            Kind::Refinement => TypeSet::REFINEMENT,
            Kind::Block => TypeSet::BLOCK,
            Kind::Group => TypeSet::GROUP,
            Kind::Path => TypeSet::PATH,
            Kind::Frame => TypeSet::FRAME,
            Kind::Error => TypeSet::ERROR,
        }
    }
}

bitflags! {
    /// Set of types a parameter accepts or a function may return.
    ///
    /// Exactly one flag describes any given cell (see [`TypeSet::of`]);
    /// the `ANY_*` constants are unions used by the parameter dialect.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct TypeSet: u32 {
        const BLANK = 1;
        const COMMA = 1 << 1;
        const INTEGER = 1 << 2;
        const DECIMAL = 1 << 3;
        const TEXT = 1 << 4;
        const TAG = 1 << 5;
        const WORD = 1 << 6;
        const SET_WORD = 1 << 7;
        const GET_WORD = 1 << 8;
        const META_WORD = 1 << 9;
        const THE_WORD = 1 << 10;
        const REFINEMENT = 1 << 11;
        const BLOCK = 1 << 12;
        const GROUP = 1 << 13;
        const PATH = 1 << 14;
        const FRAME = 1 << 15;
        const ERROR = 1 << 16;
        const QUOTED = 1 << 17;
        const QUASI = 1 << 18;

        // Antiforms.
        const NULL = 1 << 19;
        const OKAY = 1 << 20;
        const KEYWORD = 1 << 21;
        const TRASH = 1 << 22;
        const ACTION = 1 << 23;
        const PACK = 1 << 24;
        const GHOST = 1 << 25;
        const RAISED = 1 << 26;

        const LOGIC = Self::NULL.bits() | Self::OKAY.bits();
        const ANY_WORD = Self::WORD.bits() | Self::SET_WORD.bits() | Self::GET_WORD.bits()
            | Self::META_WORD.bits() | Self::THE_WORD.bits() | Self::REFINEMENT.bits();
        const ANY_LIST = Self::BLOCK.bits() | Self::GROUP.bits() | Self::PATH.bits();
        const ANY_NUMBER = Self::INTEGER.bits() | Self::DECIMAL.bits();
        const ANY_ELEMENT = (1 << 19) - 1;
        const ANY_VALUE = Self::ANY_ELEMENT.bits() | Self::LOGIC.bits() | Self::KEYWORD.bits()
            | Self::TRASH.bits() | Self::ACTION.bits();
        const ANY_ATOM = Self::ANY_VALUE.bits() | Self::PACK.bits() | Self::GHOST.bits()
            | Self::RAISED.bits();
    }
}

static NAMES: &[(&str, TypeSet)] = &[
    ("blank!", TypeSet::BLANK),
    ("comma!", TypeSet::COMMA),
    ("integer!", TypeSet::INTEGER),
    ("decimal!", TypeSet::DECIMAL),
    ("text!", TypeSet::TEXT),
    ("tag!", TypeSet::TAG),
    ("word!", TypeSet::WORD),
    ("set-word!", TypeSet::SET_WORD),
    ("get-word!", TypeSet::GET_WORD),
    ("meta-word!", TypeSet::META_WORD),
    ("the-word!", TypeSet::THE_WORD),
    ("refinement!", TypeSet::REFINEMENT),
    ("block!", TypeSet::BLOCK),
    ("group!", TypeSet::GROUP),
    ("path!", TypeSet::PATH),
    ("frame!", TypeSet::FRAME),
    ("error!", TypeSet::ERROR),
    ("quoted!", TypeSet::QUOTED),
    ("quasi!", TypeSet::QUASI),
    ("null!", TypeSet::NULL),
    ("okay!", TypeSet::OKAY),
    ("keyword!", TypeSet::KEYWORD),
    ("trash!", TypeSet::TRASH),
    ("action!", TypeSet::ACTION),
    ("pack!", TypeSet::PACK),
    ("ghost!", TypeSet::GHOST),
    ("raised!", TypeSet::RAISED),
    ("logic!", TypeSet::LOGIC),
    ("any-word!", TypeSet::ANY_WORD),
    ("any-list!", TypeSet::ANY_LIST),
    ("any-number!", TypeSet::ANY_NUMBER),
    ("any-element!", TypeSet::ANY_ELEMENT),
    ("any-value!", TypeSet::ANY_VALUE),
    ("any-atom!", TypeSet::ANY_ATOM),
];

impl TypeSet {
    /// The single flag describing `cell`.
    pub fn of(cell: &Cell) -> TypeSet {
        let lift = cell.lift();
        if lift.is_antiform() {
            return match cell.payload() {
                Payload::Word { symbol, .. } if symbol == Symbol::NULL => TypeSet::NULL,
                Payload::Word { symbol, .. } if symbol == Symbol::OKAY => TypeSet::OKAY,
                Payload::Word { .. } => TypeSet::KEYWORD,
                Payload::Blank => TypeSet::TRASH,
                Payload::Frame { .. } => TypeSet::ACTION,
                Payload::List { .. } => TypeSet::PACK,
                Payload::Comma => TypeSet::GHOST,
                Payload::Error(_) => TypeSet::RAISED,
                _ => TypeSet::empty(),
            };
        }
        if lift.quote_depth() > 0 {
            return TypeSet::QUOTED;
        }
        if lift.is_quasi() {
            return TypeSet::QUASI;
        }
        cell.kind().flag()
    }

    pub fn accepts(self, cell: &Cell) -> bool {
        self.intersects(TypeSet::of(cell))
    }

    /// Resolve a type word spelling such as `integer!` or `any-value!`.
    pub fn parse_name(name: &str) -> Option<TypeSet> {
        NAMES
            .iter()
            .find(|(spelling, _)| *spelling == name)
            .map(|(_, set)| *set)
    }

    /// Name of the type of `cell`, as reported in error messages.
    pub fn name_of(cell: &Cell) -> &'static str {
        Self::of(cell).describe_single()
    }

    fn describe_single(self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, set)| *set == self)
            .map(|(name, _)| *name)
            .unwrap_or("invalid!")
    }

    /// Human-readable listing, preferring union names where they match.
    pub fn describe(self) -> String {
        if let Some((name, _)) = NAMES.iter().rev().find(|(_, set)| *set == self) {
            return (*name).to_string();
        }
        let names: Vec<&str> = NAMES[..27]
            .iter()
            .filter(|(_, set)| self.contains(*set))
            .map(|(name, _)| *name)
            .collect();
        names.join(" or ")
    }
}
