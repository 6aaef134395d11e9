use std::{fmt, io};
use std::sync::{Arc, Mutex};
use io::{Write};

use ansi_term::Colour::{Blue, Green, Yellow};
use sexpr_tags::{Atom, ConsCell, DuplicateError, Leaf, Tag, TagRef, Value, downcast_leaf};
use sexpr_tags::built_in::{list, number, string, symbol, vector};

// ----------------------------------------------------------------------------

/// A mutable leaf, to show the difference between a copy and an alias.
#[derive(Debug)]
struct Register(Mutex<i64>);

impl Register {
    fn set(&self, v: i64) {
        if let Ok(mut r) = self.0.lock() { *r = v; }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let r = self.0.lock().map_err(|_| fmt::Error)?;
        write!(f, "r{}", *r)
    }
}

impl Atom for Register {
    fn duplicate(&self) -> Result<Leaf, DuplicateError> {
        let r = self.0.lock().map_err(|e| DuplicateError::Failed(e.to_string()))?;
        Ok(Arc::new(Register(Mutex::new(*r))))
    }
}

/// Build `(let [x 1] (print "x =" x r0))`, with `r0` tagged by `register`.
fn example(register: &TagRef) -> ConsCell {
    let r0 = ConsCell::new(register.clone(), Some(Value::leaf(Register(Mutex::new(0)))));
    list([
        symbol("let"),
        vector([symbol("x"), number(1)]),
        list([symbol("print"), string("x ="), symbol("x"), r0]),
    ])
}

/// Set every `Register` in `cell` to `v`.
fn set_registers(cell: &ConsCell, v: i64) {
    for c in cell {
        match c.value() {
            Some(Value::Cell(nested)) => set_registers(nested, v),
            Some(Value::Leaf(leaf)) => {
                if let Some(r) = downcast_leaf::<Register>(leaf) { r.set(v); }
            },
            None => {},
        }
    }
}

fn main() -> io::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    // `RUST_LOG=trace` shows which duplication strategies were tried.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut output = io::stdout();
    let register: TagRef = Tag::leaf("register").into_ref();
    let original = example(&register);
    let copy = original.duplicate();
    let alias = original.structural_clone();
    set_registers(&copy, 42);
    writeln!(output, "{}", Blue.paint(format!("original:  {}", original)))?;
    writeln!(output, "{}", Green.paint(format!("duplicate: {}", copy)))?;
    set_registers(&alias, 7);
    writeln!(output, "{}", Yellow.paint(format!("after writing through a structural clone: {}", original)))?;
    Ok(())
}
