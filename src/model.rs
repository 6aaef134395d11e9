use std::{fmt};
use std::any::{Any};
use std::sync::{Arc};

use super::{ConsCell, DuplicateError};

/// Implemented for every `'static` type, so that a `dyn Atom` can be
/// downcast to its concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    /// The name of the concrete type, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any { self }
    fn type_name(&self) -> &'static str { std::any::type_name::<T>() }
}

/// A leaf payload of a [`ConsCell`].
///
/// Leaves are shared through [`Leaf`], so an `Atom` that wants to be
/// mutable after construction must use interior mutability.
pub trait Atom: AsAny + fmt::Display + fmt::Debug + Send + Sync {
    /// Produce an equivalent, independent instance of `self`.
    ///
    /// The default has no such capability and returns
    /// [`DuplicateError::Unsupported`].
    fn duplicate(&self) -> Result<Leaf, DuplicateError> {
        Err(DuplicateError::Unsupported)
    }
}

/// A shared leaf payload.
pub type Leaf = Arc<dyn Atom>;

/// Returns the `dyn Any` view of `leaf`'s contents (not of the `Arc`).
pub fn leaf_any(leaf: &Leaf) -> &dyn Any { AsAny::as_any(&**leaf) }

/// Returns the concrete contents of `leaf` if it is a `T`.
pub fn downcast_leaf<T: Atom>(leaf: &Leaf) -> Option<&T> {
    leaf_any(leaf).downcast_ref::<T>()
}

// ----------------------------------------------------------------------------

/// The payload of a [`ConsCell`].
///
/// A missing payload is represented as `Option::<Value>::None`.
#[derive(Debug)]
pub enum Value {
    /// A nested structure, e.g. the contents of a bracketed sub-list.
    Cell(Box<ConsCell>),

    /// Anything else.
    Leaf(Leaf),
}

impl Value {
    /// Wrap an [`Atom`].
    pub fn leaf(atom: impl Atom) -> Self { Self::Leaf(Arc::new(atom)) }

    /// Returns the nested [`ConsCell`], if `self` is one.
    pub fn as_cell(&self) -> Option<&ConsCell> {
        if let Self::Cell(cell) = self { Some(cell) } else { None }
    }

    /// Returns the nested [`ConsCell`], if `self` is one.
    pub fn as_cell_mut(&mut self) -> Option<&mut ConsCell> {
        if let Self::Cell(cell) = self { Some(cell) } else { None }
    }

    /// Returns the [`Leaf`], if `self` is one.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        if let Self::Leaf(leaf) = self { Some(leaf) } else { None }
    }

    /// Assert that `self` is a `Leaf` containing a `T`.
    pub fn atom<T: Atom>(&self) -> &T {
        let Some(leaf) = self.as_leaf() else { panic!("{:?} is not a leaf", self); };
        let Some(ret) = downcast_leaf::<T>(leaf) else {
            panic!("{:?} is not a {}", leaf, std::any::type_name::<T>());
        };
        ret
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Cell(cell) => cell.render(f),
            Self::Leaf(leaf) => fmt::Display::fmt(&**leaf, f),
        }
    }
}

impl From<ConsCell> for Value {
    fn from(cell: ConsCell) -> Self { Self::Cell(Box::new(cell)) }
}

impl From<Leaf> for Value {
    fn from(leaf: Leaf) -> Self { Self::Leaf(leaf) }
}

// ----------------------------------------------------------------------------
