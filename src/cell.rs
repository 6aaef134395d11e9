use std::fmt::{self, Write};
use std::sync::{Arc};

use super::{TagRef, Value};

/// A node of a symbolic expression: a tagged payload (the car) and the rest
/// of the list (the cdr).
///
/// A payload that is itself a [`ConsCell`] is a nested structure.
#[derive(Debug)]
pub struct ConsCell {
    tag: TagRef,
    value: Option<Value>,
    next: Option<Box<ConsCell>>,
}

impl ConsCell {
    pub fn new(tag: TagRef, value: Option<Value>) -> Self {
        Self {tag, value, next: None}
    }

    /// A cell with no payload.
    pub fn empty(tag: TagRef) -> Self { Self::new(tag, None) }

    /// Link `items` into a list, or return `None` if there are none.
    pub fn list(items: impl IntoIterator<Item=(TagRef, Option<Value>)>) -> Option<Self> {
        Self::link(items.into_iter().map(|(tag, value)| Self::new(tag, value)).collect())
    }

    /// Link `cells`, which must each have no `next`, in order.
    fn link(cells: Vec<ConsCell>) -> Option<Self> {
        cells.into_iter().rev().fold(None, |next, mut cell| {
            cell.next = next.map(Box::new);
            Some(cell)
        })
    }

    pub fn tag(&self) -> &TagRef { &self.tag }

    pub fn value(&self) -> Option<&Value> { self.value.as_ref() }

    pub fn value_mut(&mut self) -> Option<&mut Value> { self.value.as_mut() }

    /// Replace the payload, returning the old one.
    pub fn set_value(&mut self, value: Option<Value>) -> Option<Value> {
        std::mem::replace(&mut self.value, value)
    }

    /// The rest of the list.
    pub fn next(&self) -> Option<&ConsCell> { self.next.as_deref() }

    pub fn next_mut(&mut self) -> Option<&mut ConsCell> { self.next.as_deref_mut() }

    /// Attach `tail` to the end of the list, returning it.
    pub fn append(&mut self, tail: ConsCell) -> &mut ConsCell {
        let mut last = self;
        while last.next.is_some() {
            last = last.next.as_deref_mut().expect("Checked by the loop condition");
        }
        last.next.insert(Box::new(tail))
    }

    /// Append a cell to the end of the list.
    pub fn push(&mut self, tag: TagRef, value: Option<Value>) -> &mut ConsCell {
        self.append(Self::new(tag, value))
    }

    /// Iterate over the cells of the list, starting with `self`.
    pub fn iter(&self) -> Iter<'_> { Iter(Some(self)) }

    /// Whether the list is `()`: a single cell with no payload.
    pub fn is_empty(&self) -> bool { self.value.is_none() && self.next.is_none() }

    /// The number of cells in the list, or `0` if it [`is_empty()`](Self::is_empty).
    pub fn len(&self) -> usize {
        if self.is_empty() { 0 } else { self.iter().count() }
    }

    /// Append the text form of the list to `out`.
    ///
    /// Each payload is rendered by its own tag; cells are separated by a
    /// space.
    pub fn render(&self, out: &mut dyn Write) -> fmt::Result {
        for (i, cell) in self.iter().enumerate() {
            if i > 0 { out.write_char(' ')?; }
            cell.tag.write_value(cell.value(), out)?;
        }
        Ok(())
    }

    /// Deep copy: every payload is duplicated by its own tag.
    ///
    /// Leaves that no strategy can copy are shared with `self`; see
    /// [`ConsType::try_duplicate()`](crate::ConsType::try_duplicate).
    pub fn duplicate(&self) -> ConsCell {
        self.copy_with(|cell| cell.tag.try_duplicate(cell.value()))
    }

    /// Copy every cell, including nested ones, but share every leaf.
    pub fn structural_clone(&self) -> ConsCell {
        self.copy_with(|cell| cell.value().map(|value| match value {
            Value::Cell(nested) => Value::from(nested.structural_clone()),
            Value::Leaf(leaf) => Value::Leaf(Arc::clone(leaf)),
        }))
    }

    /// Copy the list, computing each payload with `value`.
    fn copy_with(&self, mut value: impl FnMut(&ConsCell) -> Option<Value>) -> ConsCell {
        let cells = self.iter().map(|cell| Self::new(cell.tag.clone(), value(cell))).collect();
        Self::link(cells).expect("A list has at least one cell")
    }
}

impl Drop for ConsCell {
    fn drop(&mut self) {
        // Unlink iteratively so that long lists don't overflow the stack.
        let mut next = self.next.take();
        while let Some(mut cell) = next {
            next = cell.next.take();
        }
    }
}

impl fmt::Display for ConsCell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { self.render(f) }
}

impl<'a> IntoIterator for &'a ConsCell {
    type Item = &'a ConsCell;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Iter<'a> { self.iter() }
}

// ----------------------------------------------------------------------------

/// Iterates over the cells of a list.
#[derive(Debug, Clone)]
pub struct Iter<'a>(Option<&'a ConsCell>);

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ConsCell;

    fn next(&mut self) -> Option<Self::Item> {
        let ret = self.0?;
        self.0 = ret.next();
        Some(ret)
    }
}

// ----------------------------------------------------------------------------
