use std::{fmt};
use std::any::{self, Any, TypeId};
use std::sync::{Arc};

use thiserror::{Error};
use tracing::{debug, trace};

use crate::model::{leaf_any, AsAny, Atom, Leaf};
use super::{ConsType};

/// Why a duplication strategy did not produce a copy.
///
/// These never escape [`ConsType::try_duplicate`]; they only tell it to
/// try the next strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DuplicateError {
    /// The value has no such capability.
    #[error("no duplication capability")]
    Unsupported,

    /// A copy constructor was applied to a value of the wrong type.
    #[error("copy constructor expects `{expected}` but found `{found}`")]
    TypeMismatch { expected: &'static str, found: &'static str },

    /// The capability exists but did not work.
    #[error("duplication failed: {0}")]
    Failed(String),
}

// ----------------------------------------------------------------------------

type Construct = dyn Fn(&dyn Atom) -> Result<Leaf, DuplicateError> + Send + Sync;

/// Constructs a fresh [`Leaf`] from an existing one of the same type.
///
/// A [`Tag`](super::Tag) carries a table of these, one per leaf type it
/// knows how to copy.
#[derive(Clone)]
pub struct CopyConstructor {
    type_id: TypeId,
    type_name: &'static str,
    construct: Arc<Construct>,
}

impl CopyConstructor {
    /// Wrap `construct`, which copies a `T`.
    pub fn new<T: Atom>(
        construct: impl Fn(&T) -> Result<Leaf, DuplicateError> + Send + Sync + 'static,
    ) -> Self {
        let type_name = any::type_name::<T>();
        Self {
            type_id: TypeId::of::<T>(),
            type_name,
            construct: Arc::new(move |value: &dyn Atom| {
                let found = AsAny::type_name(value);
                let value = AsAny::as_any(value).downcast_ref::<T>()
                    .ok_or(DuplicateError::TypeMismatch {expected: type_name, found})?;
                construct(value)
            }),
        }
    }

    /// Copies a `T` using `T::clone()`.
    pub fn of<T: Atom + Clone>() -> Self {
        Self::new(|value: &T| Ok(Arc::new(value.clone()) as Leaf))
    }

    /// The type accepted by `self`.
    pub fn type_id(&self) -> TypeId { self.type_id }

    /// The name of the type accepted by `self`.
    pub fn type_name(&self) -> &'static str { self.type_name }

    /// Apply `self` to `leaf`.
    pub fn construct(&self, leaf: &Leaf) -> Result<Leaf, DuplicateError> {
        (self.construct)(&**leaf)
    }
}

impl fmt::Debug for CopyConstructor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CopyConstructor").field(&self.type_name).finish()
    }
}

// ----------------------------------------------------------------------------

/// Duplicate `leaf` under `tag`, or return `leaf` itself.
///
/// Tries [`Atom::duplicate()`](crate::Atom::duplicate), then `tag`'s copy
/// constructor for the runtime type of `leaf`. If neither works the result
/// is an alias of `leaf`.
pub fn duplicate_leaf<C: ConsType + ?Sized>(tag: &C, leaf: &Leaf) -> Leaf {
    match leaf.duplicate() {
        Ok(copy) => { return copy; },
        Err(e) => { trace!(tag = tag.name(), "self-duplication of {:?}: {}", leaf, e); },
    }
    let copier = tag.copy_constructor(Any::type_id(leaf_any(leaf)));
    match copier.ok_or(DuplicateError::Unsupported).and_then(|c| c.construct(leaf)) {
        Ok(copy) => { return copy; },
        Err(e) => { trace!(tag = tag.name(), "copy construction of {:?}: {}", leaf, e); },
    }
    debug!(tag = tag.name(), "aliasing {:?}", leaf);
    Arc::clone(leaf)
}

// ----------------------------------------------------------------------------
