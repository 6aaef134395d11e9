pub mod model;
pub use model::{AsAny, Atom, Leaf, Value, downcast_leaf};

pub mod tag;
pub use tag::{ConsType, TagRef, Tag, Delimiters, CopyConstructor, DuplicateError};

pub mod cell;
pub use cell::{ConsCell};

pub mod built_in;

// ----------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::*;
    use std::{fmt, thread};
    use std::sync::{Arc, Mutex};
    use pretty_assertions::{assert_eq};
    use built_in::{list, number, symbol, string};

    /// A mutable atom that knows how to copy itself.
    #[derive(Debug)]
    struct Numbers(Mutex<Vec<i64>>);

    impl fmt::Display for Numbers {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{:?}", self.0.lock().unwrap())
        }
    }

    impl Atom for Numbers {
        fn duplicate(&self) -> Result<Leaf, DuplicateError> {
            let v = self.0.lock().map_err(|e| DuplicateError::Failed(e.to_string()))?;
            Ok(Arc::new(Numbers(Mutex::new(v.clone()))))
        }
    }

    fn expression(tag: &TagRef) -> ConsCell {
        let mut inner = ConsCell::new(tag.clone(), Some(Value::leaf(Numbers(Mutex::new(vec![1, 2])))));
        inner.append(number(3));
        list([symbol("quote"), string("s"), ConsCell::new(TagRef::clone(&built_in::LIST), Some(inner.into()))])
    }

    #[test]
    fn shared_tag_from_many_threads() {
        test_utils::init_test_logging();
        let tag: TagRef = Tag::descender("group", "{", "}").into_ref();
        let expr = expression(&tag);
        let expected_text = expr.to_string();
        let expected_copy = expr.duplicate().to_string();
        assert_eq!(expected_text, r#"(quote "s" ({[1, 2]} 3))"#);
        assert_eq!(expected_copy, expected_text);

        let (expr, tag) = (&expr, &tag);
        let results: Vec<(String, String, String)> = thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(move || {
                let mut last = None;
                for _ in 0..100 {
                    last = Some((
                        expr.to_string(),
                        built_in::LIST.try_duplicate(expr.value()).unwrap().to_string(),
                        tag.value_to_string(Some(&Value::leaf(7i64))),
                    ));
                }
                last.unwrap()
            })).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for (text, copy, leaf) in results {
            assert_eq!(text, expected_text);
            assert_eq!(copy, r#"quote "s" ({[1, 2]} 3)"#);
            assert_eq!(leaf, "{7}");
        }
    }

    #[test]
    fn duplicate_does_not_disturb_original() {
        let tag: TagRef = Tag::leaf("vec").into_ref();
        let expr = expression(&tag);
        let copy = expr.duplicate();
        let find = |e: &ConsCell| -> Leaf {
            let nested = e.value().unwrap().as_cell().unwrap();
            let group = nested.iter().nth(2).unwrap().value().unwrap().as_cell().unwrap();
            group.value().unwrap().as_leaf().unwrap().clone()
        };
        let (original, duplicate) = (find(&expr), find(&copy));
        assert!(!Arc::ptr_eq(&original, &duplicate));
        downcast_leaf::<Numbers>(&duplicate).unwrap().0.lock().unwrap().push(9);
        assert_eq!(expr.to_string(), r#"(quote "s" ([1, 2] 3))"#);
        assert_eq!(copy.to_string(), r#"(quote "s" ([1, 2, 9] 3))"#);
    }
}
