//! Source reader.
//!
//! Reads text into a block of elements in two passes: pest produces a
//! parse tree, which is converted into a scratch tree allocated in a
//! [`Bump`] arena, which is then materialized into heap arrays bottom-up.
//! Only the materialized block survives the call. Every array is managed.

use core::ops::Range;

use bumpalo::Bump;
use ecow::EcoString;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::cell::{Element, ListKind, Sigil};
use crate::heap::{Heap, SeriesId};
use crate::symbol::SymbolTable;

#[derive(Parser)]
#[grammar = "reader/grammar.pest"]
pub struct SourceParser;

/// Byte range in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span(pub Range<usize>);

impl From<pest::Span<'_>> for Span {
    fn from(span: pest::Span<'_>) -> Self {
        Self(span.start()..span.end())
    }
}

/// A read program.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub block: SeriesId,
    /// Source span of each top-level item, in order.
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct LoadError {
    pub message: EcoString,
    pub span: Span,
}

impl LoadError {
    fn new(message: impl Into<EcoString>, span: impl Into<Span>) -> Self {
        Self {
            message: message.into(),
            span: span.into(),
        }
    }
}

fn convert_pest_error(error: pest::error::Error<Rule>) -> LoadError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };
    let message = match &error.variant {
        pest::error::ErrorVariant::ParsingError { .. } => "cannot read this".into(),
        pest::error::ErrorVariant::CustomError { message } => EcoString::from(message.as_str()),
    };
    LoadError { message, span }
}

/// Deepest quoting a lift byte can encode.
const MAX_QUOTES: u8 = 126;

#[derive(Debug)]
enum Node<'a> {
    Integer(i64),
    Decimal(f64),
    Text(&'a str),
    Tag(&'a str),
    Word(&'a str, Sigil),
    Path(&'a [&'a str]),
    Blank,
    Comma,
    List(ListKind, &'a [Item<'a>]),
}

#[derive(Debug)]
struct Item<'a> {
    node: Node<'a>,
    quotes: u8,
    quasi: bool,
}

struct Reader<'a> {
    arena: &'a Bump,
}

impl<'a> Reader<'a> {
    fn item(&self, pair: Pair<'_, Rule>) -> Result<Item<'a>, LoadError> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let (Some(quotes), Some(value)) = (inner.next(), inner.next()) else {
            return Err(LoadError::new("malformed item", span));
        };
        let quotes = u8::try_from(quotes.as_str().len())
            .ok()
            .filter(|quotes| *quotes <= MAX_QUOTES)
            .ok_or_else(|| LoadError::new("too many quote levels", span))?;
        let (node, quasi) = match value.as_rule() {
            Rule::quasi => {
                let Some(inner) = value.into_inner().next() else {
                    return Err(LoadError::new("malformed quasiform", span));
                };
                (self.node(inner)?, true)
            }
            Rule::trash => (Node::Blank, true),
            _ => (self.node(value)?, false),
        };
        Ok(Item { node, quotes, quasi })
    }

    fn node(&self, pair: Pair<'_, Rule>) -> Result<Node<'a>, LoadError> {
        let span = pair.as_span();
        let text = pair.as_str();
        let node = match pair.as_rule() {
            Rule::integer => Node::Integer(
                text.parse()
                    .map_err(|_| LoadError::new("integer out of range", span))?,
            ),
            Rule::decimal => Node::Decimal(
                text.parse()
                    .map_err(|_| LoadError::new("malformed decimal", span))?,
            ),
            Rule::text => {
                let raw = pair.into_inner().next().map_or("", |inner| inner.as_str());
                Node::Text(self.arena.alloc_str(&unescape(raw)))
            }
            Rule::tag => {
                let inner = pair.into_inner().next().map_or("", |inner| inner.as_str());
                Node::Tag(self.arena.alloc_str(inner))
            }
            Rule::blank => Node::Blank,
            Rule::comma => Node::Comma,
            Rule::word => Node::Word(self.arena.alloc_str(text), Sigil::Plain),
            Rule::set_word => self.word(pair, Sigil::Set),
            Rule::get_word => self.word(pair, Sigil::Get),
            Rule::meta_word => self.word(pair, Sigil::Meta),
            Rule::the_word => self.word(pair, Sigil::The),
            Rule::refinement => self.word(pair, Sigil::Refine),
            Rule::path => {
                let words: Vec<&'a str> = pair
                    .into_inner()
                    .map(|word| &*self.arena.alloc_str(word.as_str()))
                    .collect();
                Node::Path(self.arena.alloc_slice_copy(&words))
            }
            Rule::block | Rule::group => {
                let kind = if pair.as_rule() == Rule::block {
                    ListKind::Block
                } else {
                    ListKind::Group
                };
                let items = pair
                    .into_inner()
                    .map(|item| self.item(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Node::List(kind, self.arena.alloc_slice_fill_iter(items))
            }
            other => return Err(LoadError::new(format!("unexpected {:?}", other), span)),
        };
        Ok(node)
    }

    /// Word inside a sigil rule such as `x:` or `^x`.
    fn word(&self, pair: Pair<'_, Rule>, sigil: Sigil) -> Node<'a> {
        let name = pair.into_inner().next().map_or("", |word| word.as_str());
        Node::Word(self.arena.alloc_str(name), sigil)
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Turn a scratch item into an element, allocating its arrays.
fn materialize(heap: &mut Heap, symbols: &mut SymbolTable, item: &Item<'_>) -> Element {
    let plain = match &item.node {
        Node::Integer(n) => Element::integer(*n),
        Node::Decimal(d) => Element::decimal(*d),
        Node::Text(text) => Element::text(heap.alloc_text(*text)),
        Node::Tag(text) => Element::tag(heap.alloc_text(*text)),
        Node::Word(name, sigil) => Element::word_with(symbols.intern(name), *sigil),
        Node::Path(words) => {
            let words: Vec<Element> = words
                .iter()
                .map(|word| Element::word(symbols.intern(word)))
                .collect();
            Element::list(ListKind::Path, heap.alloc_array(&words))
        }
        Node::Blank => Element::blank(),
        Node::Comma => Element::comma(),
        Node::List(kind, items) => {
            let elements: Vec<Element> = items
                .iter()
                .map(|item| materialize(heap, symbols, item))
                .collect();
            Element::list(*kind, heap.alloc_array(&elements))
        }
    };
    let mut element = if item.quasi {
        plain.quasi().unwrap_or(plain)
    } else {
        plain
    };
    for _ in 0..item.quotes {
        element = element.quote().unwrap_or(element);
    }
    element
}

/// Read `source` into a new managed block.
pub fn read(heap: &mut Heap, symbols: &mut SymbolTable, source: &str) -> Result<Loaded, LoadError> {
    let arena = Bump::new();
    let reader = Reader { arena: &arena };
    let main = SourceParser::parse(Rule::main, source)
        .map_err(convert_pest_error)?
        .next()
        .ok_or_else(|| LoadError::new("empty parse", Span(0..0)))?;

    let mut items = Vec::new();
    let mut spans = Vec::new();
    for pair in main.into_inner() {
        if pair.as_rule() == Rule::EOI {
            break;
        }
        spans.push(Span::from(pair.as_span()));
        items.push(reader.item(pair)?);
    }

    let elements: Vec<Element> = items
        .iter()
        .map(|item| materialize(heap, symbols, item))
        .collect();
    tracing::trace!(items = elements.len(), bytes = source.len(), "read");
    Ok(Loaded {
        block: heap.alloc_array(&elements),
        spans,
    })
}

#[cfg(test)]
mod reader_test;
