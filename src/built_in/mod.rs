//! Stock leaf types and the tags that go with them.

use std::collections::{HashMap};
use std::fmt::{self, Write};
use std::sync::{Arc};

use once_cell::sync::{Lazy};

use super::{Atom, ConsCell, ConsType, Tag, TagRef, Value};
use super::tag::{NULL};

mod atoms;
pub use atoms::{Symbol};

/// Renders leaves as quoted, escaped strings.
#[derive(Debug)]
struct Quoted;

impl ConsType for Quoted {
    fn open(&self) -> Option<&str> { None }
    fn close(&self) -> Option<&str> { None }
    fn name(&self) -> &str { "string" }

    fn write_value(&self, value: Option<&Value>, out: &mut dyn Write) -> fmt::Result {
        match value {
            None => out.write_str(NULL),
            Some(Value::Cell(cell)) => cell.render(out),
            Some(Value::Leaf(leaf)) => write!(out, "{:?}", leaf.to_string()),
        }
    }
}

/// A bracketed sub-list.
pub static LIST: Lazy<TagRef> = Lazy::new(|| Tag::descender("list", "(", ")").into_ref());

/// A bracketed vector.
pub static VECTOR: Lazy<TagRef> = Lazy::new(|| Tag::descender("vector", "[", "]").into_ref());

/// Any other leaf.
pub static ATOM: Lazy<TagRef> = Lazy::new(|| Tag::leaf("atom").into_ref());

pub static SYMBOL: Lazy<TagRef> = Lazy::new(|| Tag::leaf("symbol").into_ref());

pub static NUMBER: Lazy<TagRef> = Lazy::new(|| Tag::leaf("number").into_ref());

pub static BOOLEAN: Lazy<TagRef> = Lazy::new(|| Tag::leaf("boolean").into_ref());

pub static STRING: Lazy<TagRef> = Lazy::new(|| Arc::new(Quoted) as TagRef);

/// The stock tags, keyed by name.
static BY_NAME: Lazy<HashMap<&'static str, &'static TagRef>> = Lazy::new(|| {
    [&LIST, &VECTOR, &ATOM, &SYMBOL, &NUMBER, &BOOLEAN, &STRING].into_iter()
        .map(|tag| -> &'static TagRef { tag })
        .map(|tag| (tag.name(), tag))
        .collect()
});

/// Returns the stock tag called `name`.
pub fn lookup(name: &str) -> Option<&'static TagRef> { BY_NAME.get(name).copied() }

// ----------------------------------------------------------------------------

fn leaf(tag: &TagRef, atom: impl Atom) -> ConsCell {
    ConsCell::new(tag.clone(), Some(Value::leaf(atom)))
}

/// A leaf of any type, tagged [`ATOM`].
pub fn atom(value: impl Atom) -> ConsCell { leaf(&ATOM, value) }

pub fn symbol(name: &str) -> ConsCell { leaf(&SYMBOL, Symbol::new(name)) }

pub fn number(n: i64) -> ConsCell { leaf(&NUMBER, n) }

pub fn float(x: f64) -> ConsCell { leaf(&NUMBER, x) }

pub fn boolean(b: bool) -> ConsCell { leaf(&BOOLEAN, b) }

pub fn string(s: &str) -> ConsCell { leaf(&STRING, String::from(s)) }

/// Concatenate `items` into a list wrapped in `tag`, which should be a
/// descender.
fn group(tag: &TagRef, items: impl IntoIterator<Item=ConsCell>) -> ConsCell {
    let mut items = items.into_iter();
    let contents = items.next().map(|mut first| {
        for item in items { first.append(item); }
        Value::from(first)
    });
    ConsCell::new(tag.clone(), contents)
}

/// `(items...)`
pub fn list(items: impl IntoIterator<Item=ConsCell>) -> ConsCell { group(&LIST, items) }

/// `[items...]`
pub fn vector(items: impl IntoIterator<Item=ConsCell>) -> ConsCell { group(&VECTOR, items) }

// ----------------------------------------------------------------------------
