use std::fmt::{self, Write};
use std::any::{TypeId};
use std::hash::{Hash, Hasher};
use std::sync::{Arc};

use super::{Value};

mod copy;
pub use copy::{DuplicateError, CopyConstructor, duplicate_leaf};

/// Identifies what kind of value a [`ConsCell`](crate::ConsCell) holds.
///
/// All implementations must be immutable. Tags are shared between many
/// cells and threads, and are used as hash keys.
///
/// Two tags hash and compare equal if and only if their names are equal.
pub trait ConsType: Send + Sync + fmt::Debug {
    /// The open symbol if `self` marks a descender, otherwise `None`.
    ///
    /// Must be `Some` exactly when [`close()`](Self::close) is `Some`.
    fn open(&self) -> Option<&str>;

    /// The close symbol if `self` marks a descender, otherwise `None`.
    fn close(&self) -> Option<&str>;

    /// Must be non-empty.
    fn name(&self) -> &str;

    /// Whether values of this type are rendered as a bracketed group.
    fn marks_descender(&self) -> bool { self.open().is_some() }

    /// Returns a copy constructor for leaves whose runtime type is
    /// `type_id`, if `self` knows one.
    fn copy_constructor(&self, _type_id: TypeId) -> Option<&CopyConstructor> { None }

    /// Forwards to [`write_value()`](Self::write_value).
    ///
    /// # Panics
    ///
    /// If the `Display` implementation of a leaf returns an error.
    fn value_to_string(&self, value: Option<&Value>) -> String {
        let mut ret = String::new();
        self.write_value(value, &mut ret)
            .expect("a Display implementation returned an error unexpectedly");
        ret
    }

    /// Append the text form of `value` to `out`.
    ///
    /// A descender brackets `value` with its open and close symbols, even if
    /// `value` is `None`. Otherwise nested cells are rendered inline, so that
    /// a chain of cells reads as one sequence, and `None` is written as
    /// [`NULL`].
    fn write_value(&self, value: Option<&Value>, out: &mut dyn Write) -> fmt::Result {
        if self.marks_descender() {
            out.write_str(self.open().unwrap_or_default())?;
            match value {
                None => {},
                Some(Value::Cell(cell)) => { cell.render(out)?; },
                Some(Value::Leaf(leaf)) => { write!(out, "{}", leaf)?; },
            }
            out.write_str(self.close().unwrap_or_default())
        } else {
            match value {
                None => out.write_str(NULL),
                Some(Value::Cell(cell)) => cell.render(out),
                Some(Value::Leaf(leaf)) => write!(out, "{}", leaf),
            }
        }
    }

    /// Best-effort duplication of `value`.
    ///
    /// Cells are duplicated with [`ConsCell::duplicate()`](crate::ConsCell::duplicate),
    /// leaves with [`duplicate_leaf()`]. Never fails: if nothing can copy a
    /// leaf the result shares it with `value`.
    fn try_duplicate(&self, value: Option<&Value>) -> Option<Value> {
        Some(match value? {
            Value::Cell(cell) => Value::from(cell.duplicate()),
            Value::Leaf(leaf) => Value::Leaf(duplicate_leaf(self, leaf)),
        })
    }
}

impl Hash for dyn ConsType + '_ {
    fn hash<H: Hasher>(&self, state: &mut H) { self.name().hash(state) }
}

impl PartialEq for dyn ConsType + '_ {
    fn eq(&self, other: &Self) -> bool { self.name() == other.name() }
}

impl Eq for dyn ConsType + '_ {}

impl fmt::Display for dyn ConsType + '_ {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.name()) }
}

/// The text of a missing payload outside any brackets.
pub const NULL: &str = "null";

/// A shared [`ConsType`].
pub type TagRef = Arc<dyn ConsType>;

// ----------------------------------------------------------------------------

/// The open and close symbols of a descender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub open: Arc<str>,
    pub close: Arc<str>,
}

/// A [`ConsType`] defined by data.
///
/// The delimiters are either both present or both absent by construction.
#[derive(Debug, Clone)]
pub struct Tag {
    name: Arc<str>,
    delimiters: Option<Delimiters>,
    copiers: Vec<CopyConstructor>,
}

impl Tag {
    /// A tag that is not a descender.
    pub fn leaf(name: impl Into<Arc<str>>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "Tag name must be non-empty");
        Self {name, delimiters: None, copiers: Vec::new()}
    }

    /// A tag that brackets its values with `open` and `close`.
    pub fn descender(
        name: impl Into<Arc<str>>,
        open: impl Into<Arc<str>>,
        close: impl Into<Arc<str>>,
    ) -> Self {
        let delimiters = Delimiters {open: open.into(), close: close.into()};
        Self {delimiters: Some(delimiters), ..Self::leaf(name)}
    }

    /// Add `copier` to the copy constructors of `self`.
    ///
    /// Replaces any existing copy constructor for the same type.
    pub fn with_copy_constructor(mut self, copier: CopyConstructor) -> Self {
        self.copiers.retain(|c| c.type_id() != copier.type_id());
        self.copiers.push(copier);
        self
    }

    /// Copy `T`s using `T::clone()`.
    pub fn with_copy<T: crate::Atom + Clone>(self) -> Self {
        self.with_copy_constructor(CopyConstructor::of::<T>())
    }

    /// The open and close symbols, if `self` is a descender.
    pub fn delimiters(&self) -> Option<&Delimiters> { self.delimiters.as_ref() }

    /// Share `self`.
    pub fn into_ref(self) -> TagRef { Arc::new(self) }
}

impl ConsType for Tag {
    fn open(&self) -> Option<&str> { self.delimiters.as_ref().map(|d| &*d.open) }
    fn close(&self) -> Option<&str> { self.delimiters.as_ref().map(|d| &*d.close) }
    fn name(&self) -> &str { &self.name }

    fn copy_constructor(&self, type_id: TypeId) -> Option<&CopyConstructor> {
        self.copiers.iter().find(|c| c.type_id() == type_id)
    }
}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) { self.name.hash(state) }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool { self.name == other.name }
}

impl Eq for Tag {}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.name) }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap};
    use std::collections::hash_map::{DefaultHasher};
    use std::sync::{Mutex};
    use pretty_assertions::{assert_eq};
    use crate::{Atom, Leaf};

    fn hash_of<T: Hash + ?Sized>(x: &T) -> u64 {
        let mut h = DefaultHasher::new();
        x.hash(&mut h);
        h.finish()
    }

    fn round() -> Tag { Tag::descender("round", "(", ")") }

    /// A hand-written tag.
    #[derive(Debug)]
    struct Quote;

    impl ConsType for Quote {
        fn open(&self) -> Option<&str> { Some("'[") }
        fn close(&self) -> Option<&str> { Some("]") }
        fn name(&self) -> &str { "quote" }
    }

    /// An atom that can copy itself.
    #[derive(Debug)]
    struct Cloneable(Mutex<String>);

    impl fmt::Display for Cloneable {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str(&self.0.lock().unwrap())
        }
    }

    impl Atom for Cloneable {
        fn duplicate(&self) -> Result<Leaf, DuplicateError> {
            let s = self.0.lock().map_err(|e| DuplicateError::Failed(e.to_string()))?;
            Ok(Arc::new(Cloneable(Mutex::new(s.clone()))))
        }
    }

    /// An atom whose self-duplication always fails.
    #[derive(Debug, Clone, PartialEq)]
    struct Stubborn(u8);

    impl fmt::Display for Stubborn {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "#{}", self.0) }
    }

    impl Atom for Stubborn {
        fn duplicate(&self) -> Result<Leaf, DuplicateError> {
            Err(DuplicateError::Failed("stubborn".into()))
        }
    }

    #[test]
    fn hash_is_hash_of_name() {
        let tags: [TagRef; 3] = [round().into_ref(), Tag::leaf("word").into_ref(), Arc::new(Quote)];
        for tag in &tags {
            assert_eq!(hash_of(&**tag), hash_of(tag.name()));
        }
        assert_eq!(hash_of(&round()), hash_of("round"));
    }

    #[test]
    fn tags_are_keyed_by_name() {
        let mut map: HashMap<TagRef, u32> = HashMap::new();
        map.insert(round().into_ref(), 1);
        map.insert(Tag::descender("round", "[", "]").into_ref(), 2);
        map.insert(Arc::new(Quote), 3);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&(Tag::leaf("round").into_ref())], 2);
    }

    #[test]
    fn delimiters_and_descender_agree() {
        let tags: [TagRef; 3] = [round().into_ref(), Tag::leaf("word").into_ref(), Arc::new(Quote)];
        for tag in &tags {
            assert_eq!(tag.open().is_some(), tag.close().is_some());
            assert_eq!(tag.marks_descender(), tag.open().is_some());
        }
        assert!(round().marks_descender());
        assert!(!Tag::leaf("word").marks_descender());
    }

    #[test]
    fn render_none_in_brackets() {
        assert_eq!(round().value_to_string(None), "()");
        assert_eq!(Quote.value_to_string(None), "'[]");
    }

    #[test]
    fn render_none_without_brackets() {
        assert_eq!(Tag::leaf("word").value_to_string(None), "null");
        let mut out = String::from("a ");
        Tag::leaf("word").write_value(None, &mut out).unwrap();
        assert_eq!(out, "a null");
    }

    #[test]
    fn render_leaf() {
        let value = Value::leaf(42i64);
        assert_eq!(Tag::leaf("number").value_to_string(Some(&value)), "42");
        assert_eq!(round().value_to_string(Some(&value)), "(42)");
    }

    #[test]
    fn write_value_appends() {
        let mut out = String::from("> ");
        round().write_value(Some(&Value::leaf(true)), &mut out).unwrap();
        assert_eq!(out, "> (true)");
    }

    #[test]
    fn duplicate_none() {
        assert!(round().try_duplicate(None).is_none());
    }

    #[test]
    fn duplicate_falls_back_to_alias() {
        let leaf: Leaf = Arc::new(Stubborn(1));
        let value = Value::Leaf(leaf.clone());
        let copy = Tag::leaf("x").try_duplicate(Some(&value)).unwrap();
        assert!(Arc::ptr_eq(copy.as_leaf().unwrap(), &leaf));
    }

    #[test]
    fn duplicate_uses_self_duplication() {
        let value = Value::leaf(Cloneable(Mutex::new("abc".into())));
        let copy = Tag::leaf("x").try_duplicate(Some(&value)).unwrap();
        assert!(!Arc::ptr_eq(copy.as_leaf().unwrap(), value.as_leaf().unwrap()));
        assert_eq!(copy.to_string(), value.to_string());
        *copy.atom::<Cloneable>().0.lock().unwrap() = "xyz".into();
        assert_eq!(value.to_string(), "abc");
    }

    #[test]
    fn duplicate_uses_copy_constructor_after_failure() {
        let value = Value::leaf(Stubborn(9));
        let tag = Tag::leaf("x").with_copy::<Stubborn>();
        let copy = tag.try_duplicate(Some(&value)).unwrap();
        assert!(!Arc::ptr_eq(copy.as_leaf().unwrap(), value.as_leaf().unwrap()));
        assert_eq!(copy.atom::<Stubborn>(), &Stubborn(9));
    }

    #[test]
    fn copy_constructor_for_other_type_is_ignored() {
        let leaf: Leaf = Arc::new(Stubborn(2));
        let tag = Tag::leaf("x").with_copy::<i64>();
        let copy = tag.try_duplicate(Some(&Value::Leaf(leaf.clone()))).unwrap();
        assert!(Arc::ptr_eq(copy.as_leaf().unwrap(), &leaf));
    }

    #[test]
    fn failing_copy_constructor_is_swallowed() {
        let leaf: Leaf = Arc::new(Stubborn(3));
        let tag = Tag::leaf("x").with_copy_constructor(CopyConstructor::new(
            |_: &Stubborn| Err(DuplicateError::Failed("no".into()))
        ));
        let copy = tag.try_duplicate(Some(&Value::Leaf(leaf.clone()))).unwrap();
        assert!(Arc::ptr_eq(copy.as_leaf().unwrap(), &leaf));
    }

    #[test]
    fn later_copy_constructor_replaces_earlier() {
        let tag = Tag::leaf("x")
            .with_copy_constructor(CopyConstructor::new(|_: &Stubborn| Err(DuplicateError::Unsupported)))
            .with_copy::<Stubborn>();
        let leaf: Leaf = Arc::new(Stubborn(4));
        let copy = tag.try_duplicate(Some(&Value::Leaf(leaf.clone()))).unwrap();
        assert!(!Arc::ptr_eq(copy.as_leaf().unwrap(), &leaf));
    }
}
