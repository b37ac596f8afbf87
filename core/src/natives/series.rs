//! Block and text access.
//!
//! Positions are 1-based and relative to the list's index. Length changes
//! fail on frozen or held series; `poke` only needs the series unfrozen.

use super::{Entry, block_arg, done, element_arg, integer_arg};
use crate::bounce::Bounce;
use crate::cell::{Element, ListKind, Payload, Value};
use crate::error::{Error, ErrorKind, crash};
use crate::interpreter::Interpreter;
use crate::level::LevelId;

pub const NATIVES: &[Entry] = &[
    ("first", "[series [block!]]", first),
    ("next", "[series [block!]]", next),
    ("length-of", "[series [block! text!]]", length_of),
    ("append", "[series [block!] value]", append),
    ("insert", "[series [block!] value]", insert),
    ("take", "[series [block!]]", take),
    ("poke", "[series [block!] index [integer!] value]", poke),
    ("copy", "[value [block! text! action!]]", copy),
    ("freeze", "[series [block! text!]]", freeze),
    ("frozen?", "[series [block! text!]]", frozen_q),
];

/// Items to add for `value`: a block contributes its items, anything
/// else itself.
fn items_of(interp: &Interpreter, id: LevelId, n: usize) -> Result<Vec<Element>, Error> {
    let value = element_arg(interp, id, n)?;
    Ok(match value.as_list(ListKind::Block) {
        Some((series, index)) => interp
            .heap
            .array(series)
            .get(index as usize..)
            .unwrap_or(&[])
            .to_vec(),
        None => vec![value],
    })
}

/// First item, or null at the tail.
fn first(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (_, series, index) = block_arg(interp, id, 0);
    let item = interp.heap.array(series).get(index as usize).copied();
    done(interp, id, item.map_or(Value::null(), Value::from))
}

/// Same block, one position further (stays at the tail).
fn next(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (block, series, index) = block_arg(interp, id, 0);
    let len = interp.heap.array(series).len() as u32;
    done(interp, id, block.at_index((index + 1).min(len)))
}

fn length_of(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let series = interp.arg(id, 0);
    let len = match series.payload() {
        Payload::List { series, index, .. } => {
            interp.heap.array(series).len().saturating_sub(index as usize)
        }
        Payload::Text(text) => interp.heap.text(text).chars().count(),
        _ => crash("length-of argument was not typechecked"),
    };
    done(interp, id, Value::integer(len as i64))
}

/// Add to the tail; gives the series back.
fn append(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (block, series, _) = block_arg(interp, id, 0);
    let items = items_of(interp, id, 1)?;
    interp.heap.array_mut(series)?.extend_from_slice(&items);
    done(interp, id, block)
}

/// Add at the series position; gives the position after the insertion.
fn insert(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (block, series, index) = block_arg(interp, id, 0);
    let items = items_of(interp, id, 1)?;
    let buffer = interp.heap.array_mut(series)?;
    let at = (index as usize).min(buffer.len());
    for (offset, item) in items.iter().enumerate() {
        buffer.insert(at + offset, *item);
    }
    done(interp, id, block.at_index((at + items.len()) as u32))
}

/// Remove and give the item at the series position, null at the tail.
fn take(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (_, series, index) = block_arg(interp, id, 0);
    if index as usize >= interp.heap.array(series).len() {
        return done(interp, id, Value::null());
    }
    let taken = interp.heap.array_mut(series)?.remove(index as usize);
    done(interp, id, taken.map_or(Value::null(), Value::from))
}

/// Replace one item in place.
fn poke(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (_, series, index) = block_arg(interp, id, 0);
    let position = integer_arg(interp, id, 1);
    let value = element_arg(interp, id, 2)?;
    let cells = interp.heap.array_cells_mut(series)?;
    let slot = usize::try_from(position - 1)
        .ok()
        .and_then(|offset| cells.get_mut(index as usize + offset))
        .ok_or(ErrorKind::OutOfRange { index: position })?;
    *slot = value;
    done(interp, id, value)
}

/// Shallow copy of a block (from its position) or text. Copying an action
/// gives a new identity with the same interface and behavior.
fn copy(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let value = interp.arg(id, 0);
    if let Some((phase, coupling, infix)) = value.as_action() {
        let details = interp.details(phase).clone();
        let copied = interp.make_phase(details);
        return done(interp, id, Value::action(copied, coupling, infix));
    }
    let copied = match value.payload() {
        Payload::List { series, index, .. } => {
            let items = interp
                .heap
                .array(series)
                .get(index as usize..)
                .unwrap_or(&[])
                .to_vec();
            interp.make_block(&items)
        }
        Payload::Text(series) => {
            let text = interp.heap.text(series).to_string();
            interp.make_text(text)
        }
        _ => crash("copy argument was not typechecked"),
    };
    done(interp, id, copied)
}

/// Freeze permanently, deeply for blocks.
fn freeze(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let value = interp.arg(id, 0);
    match value.payload() {
        Payload::List { series, .. } => interp.heap.freeze_deep(series),
        Payload::Text(series) => interp.heap.freeze(series),
        _ => crash("freeze argument was not typechecked"),
    }
    done(interp, id, value)
}

fn frozen_q(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let Some(series) = interp.arg(id, 0).series() else {
        crash("frozen? argument was not typechecked");
    };
    let frozen = interp.heap.is_frozen(series);
    done(interp, id, Value::logic(frozen))
}

#[cfg(test)]
#[path = "series_test.rs"]
mod series_test;
