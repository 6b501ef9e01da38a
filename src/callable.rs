//! Anything that can appear to the left of `(...)`.
//!
//! Native functions, user functions and classes share one contract, an arity
//! and a `call`, and dispatch by matching the variant.

use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use log::debug;

use crate::class::Class;
use crate::function::Function;
use crate::interpreter::{IResult, Interpreter};
use crate::value::Value;

/// A function implemented in Rust and exposed as a global.
#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> Value,
}

impl NativeFunction {
    /// `clock()`: wall-clock seconds since the Unix epoch.
    pub fn clock() -> Self {
        NativeFunction {
            name: "clock",
            arity: 0,
            func: |_args| {
                let micros = Utc::now().timestamp_micros();
                Value::Number(micros as f64 / 1_000_000.0)
            },
        }
    }
}

#[derive(Clone)]
pub enum Callable {
    Native(NativeFunction),
    Function(Rc<Function>),
    Class(Rc<Class>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.arity(),
            Callable::Class(class) => class.arity(),
        }
    }

    /// Invoke with arguments whose count the caller has already checked
    /// against [`arity`](Self::arity).
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> IResult<Value> {
        debug!("Calling {} with {} argument(s)", self, arguments.len());

        match self {
            Callable::Native(native) => Ok((native.func)(&arguments)),
            Callable::Function(function) => function.call(interpreter, arguments),
            Callable::Class(class) => Class::call(class, interpreter, arguments),
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => a.name == b.name,
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "<native fn>"),
            Callable::Function(function) => write!(f, "{}", function),
            Callable::Class(class) => write!(f, "{}", class),
        }
    }
}
