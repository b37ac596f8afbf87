//! Source-like rendering of cells.
//!
//! Antiforms render as their quasiform (`~null~`, `~[...]~`), except
//! trash which is a lone `~`. Lists render from their index. Frames and
//! errors have no literal syntax and use a `#[type! ...]` construction
//! form.

use core::fmt::Write;

use smallvec::SmallVec;

use crate::cell::{Cell, ListKind, Payload, Sigil};
use crate::heap::SeriesId;
use crate::interpreter::Interpreter;

impl Interpreter {
    /// Render any cell.
    pub fn mold(&self, cell: &Cell) -> String {
        let mut molder = Molder {
            interp: self,
            out: String::new(),
            stack: SmallVec::new(),
        };
        molder.cell(cell);
        molder.out
    }
}

struct Molder<'a> {
    interp: &'a Interpreter,
    out: String,
    /// Lists being rendered, to cut cycles short.
    stack: SmallVec<[SeriesId; 8]>,
}

impl Molder<'_> {
    fn cell(&mut self, cell: &Cell) {
        let lift = cell.lift();
        for _ in 0..lift.quote_depth() {
            self.out.push('\'');
        }
        if lift.is_plain() || (lift.quote_depth() > 0 && !lift.is_quasi()) {
            self.payload(cell.payload());
            return;
        }
        // Antiform or quasiform.
        if matches!(cell.payload(), Payload::Blank) {
            self.out.push('~');
            return;
        }
        self.out.push('~');
        self.payload(cell.payload());
        self.out.push('~');
    }

    fn payload(&mut self, payload: Payload) {
        let interp = self.interp;
        let heap = &interp.heap;
        match payload {
            Payload::Blank => self.out.push('_'),
            Payload::Comma => self.out.push(','),
            Payload::Integer(n) => {
                let _ = write!(self.out, "{}", n);
            }
            Payload::Decimal(d) => self.decimal(d),
            Payload::Text(id) => self.text(heap.text(id)),
            Payload::Tag(id) => {
                let _ = write!(self.out, "<{}>", heap.text(id));
            }
            Payload::Word { symbol, sigil, .. } => {
                let name = interp.symbols.name(symbol);
                let _ = match sigil {
                    Sigil::Plain => write!(self.out, "{}", name),
                    Sigil::Set => write!(self.out, "{}:", name),
                    Sigil::Get => write!(self.out, ":{}", name),
                    Sigil::Meta => write!(self.out, "^{}", name),
                    Sigil::The => write!(self.out, "@{}", name),
                    Sigil::Refine => write!(self.out, "/{}", name),
                };
            }
            Payload::List { kind, series, index, .. } => self.list(kind, series, index),
            Payload::Frame { phase, .. } => {
                let name = heap.details(phase).name;
                let name = name.map_or("anonymous", |name| interp.symbols.name(name));
                let _ = write!(self.out, "#[frame! {}]", name);
            }
            Payload::Error(id) => {
                let message = heap.error(id).kind.to_string();
                self.out.push_str("#[error! ");
                self.text(&message);
                self.out.push(']');
            }
        }
    }

    fn decimal(&mut self, d: f64) {
        let start = self.out.len();
        let _ = write!(self.out, "{}", d);
        if d.is_finite() && !self.out[start..].contains(['.', 'e']) {
            self.out.push_str(".0");
        }
    }

    fn text(&mut self, text: &str) {
        self.out.push('"');
        for c in text.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\t' => self.out.push_str("\\t"),
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn list(&mut self, kind: ListKind, series: SeriesId, index: u32) {
        let (open, close, separator) = match kind {
            ListKind::Block => ("[", "]", " "),
            ListKind::Group => ("(", ")", " "),
            ListKind::Path => ("", "", "/"),
        };
        if self.stack.contains(&series) {
            let _ = write!(self.out, "{}...{}", open, close);
            return;
        }
        self.stack.push(series);
        self.out.push_str(open);
        let interp = self.interp;
        let items = interp.heap.array(series);
        for (n, item) in items.iter().skip(index as usize).enumerate() {
            if n > 0 {
                self.out.push_str(separator);
            }
            self.cell(item);
        }
        self.out.push_str(close);
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::eval;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decimals_keep_their_point() {
        assert_eq!(eval("2.0"), "2.0");
        assert_eq!(eval("0.25"), "0.25");
    }

    #[test]
    fn test_antiforms_mold_as_quasiforms() {
        assert_eq!(eval("null"), "~null~");
        assert_eq!(eval("~"), "~");
        assert_eq!(eval("meta comment 1"), "~,~");
        assert_eq!(eval("pack []"), "~[]~");
    }

    #[test]
    fn test_lists_mold_from_their_index() {
        assert_eq!(eval("next [a b c]"), "[b c]");
        assert_eq!(eval("the (a b)"), "(a b)");
    }

    #[test]
    fn test_cycles_are_cut() {
        assert_eq!(eval("b: [1 2] poke b 2 b b"), "[1 [...]]");
    }

    #[test]
    fn test_frames_and_errors() {
        assert_eq!(eval(":add"), "~#[frame! add]~");
        assert_eq!(eval("rescue [fail \"bad \\\"x\\\"\"]"), "#[error! \"bad \\\"x\\\"\"]");
    }
}
