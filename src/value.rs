use std::fmt;
use std::rc::Rc;

use crate::callable::Callable;
use crate::class::InstanceRef;

/// A dynamically typed runtime value.
///
/// Callables and instances are reference types: cloning a `Value` clones the
/// `Rc`, so every alias observes the same fields and closure scopes.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Callable(Callable),
    Instance(InstanceRef),
}

impl Value {
    pub fn string<S: AsRef<str>>(s: S) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }
}

/// Display form of a number: `2.0` prints as `2`, `2.5` as `2.5`.
pub fn format_number(n: f64) -> String {
    let text = n.to_string();

    match text.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => text,
    }
}

impl PartialEq for Value {
    /// Same-type structural equality for primitives, identity for callables
    /// and instances.  Values of different types are never equal.  Numbers
    /// compare by bit pattern: `0 == -0` is false, a NaN equals itself.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Callable(c) => write!(f, "{}", c),
            Value::Instance(instance) => write!(f, "{}", instance.borrow()),
        }
    }
}

// Closures capture the scope they are stored in, so a derived Debug would
// recurse forever.  Print the display form instead.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}
