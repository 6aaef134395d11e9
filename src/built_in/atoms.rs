use std::{fmt};
use std::sync::{Arc};

use crate::{Atom};

/// Immutable types, whose leaves are safe to share when a structure is
/// duplicated.
macro_rules! immutable_atoms {
    ($($t:ty),* $(,)?) => { $(impl Atom for $t {})* };
}

immutable_atoms!(i32, i64, u32, u64, f32, f64, bool, char, String, &'static str, Box<str>);

// ----------------------------------------------------------------------------

/// A lisp symbol.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: impl Into<Arc<str>>) -> Self { Self(name.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.0) }
}

impl Atom for Symbol {}
