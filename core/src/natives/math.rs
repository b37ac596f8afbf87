//! Arithmetic, comparison and logic.
//!
//! Integers overflow into an error rather than wrapping. Mixing an
//! integer with a decimal gives a decimal.

use core::cmp::Ordering;

use super::{Entry, done};
use crate::bounce::Bounce;
use crate::cell::{Cell, Payload, Value};
use crate::error::{Error, ErrorKind};
use crate::heap::Heap;
use crate::interpreter::Interpreter;
use crate::level::LevelId;

pub const NATIVES: &[Entry] = &[
    ("add", "[value1 [any-number!] value2 [any-number!]]", add),
    ("subtract", "[value1 [any-number!] value2 [any-number!]]", subtract),
    ("multiply", "[value1 [any-number!] value2 [any-number!]]", multiply),
    ("negate", "[number [any-number!]]", negate),
    ("equal?", "[value1 value2]", equal_q),
    ("lesser?", "[value1 [any-number! text!] value2 [any-number! text!]]", lesser_q),
    ("greater?", "[value1 [any-number! text!] value2 [any-number! text!]]", greater_q),
    ("not", "[value]", not),
];

// ============================================================================
// Arithmetic
// ============================================================================

#[derive(Clone, Copy)]
enum Number {
    Integer(i64),
    Decimal(f64),
}

impl Number {
    fn of(value: &Value) -> Number {
        match value.payload() {
            Payload::Integer(n) => Number::Integer(n),
            Payload::Decimal(d) => Number::Decimal(d),
            _ => crate::error::crash("number argument was not typechecked"),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Decimal(d) => d,
        }
    }
}

fn arithmetic(
    interp: &mut Interpreter,
    id: LevelId,
    integers: fn(i64, i64) -> Option<i64>,
    decimals: fn(f64, f64) -> f64,
) -> Result<Bounce, Error> {
    let a = Number::of(&interp.arg(id, 0));
    let b = Number::of(&interp.arg(id, 1));
    let result = match (a, b) {
        (Number::Integer(a), Number::Integer(b)) => {
            Value::integer(integers(a, b).ok_or(ErrorKind::Overflow)?)
        }
        (a, b) => Value::decimal(decimals(a.as_f64(), b.as_f64())),
    };
    done(interp, id, result)
}

/// Sum of two numbers.
fn add(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    arithmetic(interp, id, i64::checked_add, |a, b| a + b)
}

/// Difference of two numbers.
fn subtract(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    arithmetic(interp, id, i64::checked_sub, |a, b| a - b)
}

/// Product of two numbers.
fn multiply(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    arithmetic(interp, id, i64::checked_mul, |a, b| a * b)
}

fn negate(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let result = match Number::of(&interp.arg(id, 0)) {
        Number::Integer(n) => Value::integer(n.checked_neg().ok_or(ErrorKind::Overflow)?),
        Number::Decimal(d) => Value::decimal(-d),
    };
    done(interp, id, result)
}

// ============================================================================
// Comparison
// ============================================================================

/// Structural equality. Words compare by spelling, lists by content from
/// their positions, numbers across integer and decimal.
pub(crate) fn equal(heap: &Heap, a: &Cell, b: &Cell) -> bool {
    if a.lift() != b.lift() {
        return false;
    }
    match (a.payload(), b.payload()) {
        (Payload::Integer(x), Payload::Decimal(y)) | (Payload::Decimal(y), Payload::Integer(x)) => {
            x as f64 == y
        }
        (Payload::Text(x), Payload::Text(y)) | (Payload::Tag(x), Payload::Tag(y)) => {
            heap.text(x) == heap.text(y)
        }
        (
            Payload::Word { symbol: x, sigil: s, .. },
            Payload::Word { symbol: y, sigil: t, .. },
        ) => x == y && s == t,
        (
            Payload::List { kind: k, series: x, index: i, .. },
            Payload::List { kind: l, series: y, index: j, .. },
        ) => {
            if k != l {
                return false;
            }
            let xs = heap.array(x).get(i as usize..).unwrap_or(&[]);
            let ys = heap.array(y).get(j as usize..).unwrap_or(&[]);
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| equal(heap, x, y))
        }
        (Payload::Frame { phase: x, .. }, Payload::Frame { phase: y, .. }) => x == y,
        (x, y) => x == y,
    }
}

fn compare(interp: &Interpreter, id: LevelId) -> Result<Ordering, Error> {
    let a = interp.arg(id, 0);
    let b = interp.arg(id, 1);
    match (a.payload(), b.payload()) {
        (Payload::Text(x), Payload::Text(y)) => Ok(interp.heap.text(x).cmp(interp.heap.text(y))),
        (Payload::Text(_), _) | (_, Payload::Text(_)) => Err(Error::new(ErrorKind::invalid(
            "cannot compare text with a number",
        ))),
        _ => {
            let (x, y) = (Number::of(&a), Number::of(&b));
            let ordering = match (x, y) {
                (Number::Integer(x), Number::Integer(y)) => Some(x.cmp(&y)),
                (x, y) => x.as_f64().partial_cmp(&y.as_f64()),
            };
            ordering.ok_or_else(|| ErrorKind::invalid("cannot order NaN").into())
        }
    }
}

fn equal_q(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let result = equal(&interp.heap, &interp.arg(id, 0), &interp.arg(id, 1));
    done(interp, id, Value::logic(result))
}

fn lesser_q(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let result = compare(interp, id)? == Ordering::Less;
    done(interp, id, Value::logic(result))
}

fn greater_q(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let result = compare(interp, id)? == Ordering::Greater;
    done(interp, id, Value::logic(result))
}

/// Logic complement; only null is falsey.
fn not(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let result = !interp.arg(id, 0).is_truthy();
    done(interp, id, Value::logic(result))
}

#[cfg(test)]
#[path = "math_test.rs"]
mod math_test;
