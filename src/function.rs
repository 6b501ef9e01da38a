use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::class::InstanceRef;
use crate::environment::{EnvRef, Environment};
use crate::interpreter::{IResult, InterpretError, Interpreter};
use crate::stmt::FunctionDecl;
use crate::value::Value;

/// A user-defined function: its declaration plus the scope it was defined in.
pub struct Function {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_constructor: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_constructor: bool) -> Self {
        Function {
            declaration,
            closure,
            is_constructor,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// A copy of this method whose closure has one extra scope binding
    /// `this` to `instance`.
    pub fn bind(&self, instance: InstanceRef) -> Function {
        let mut env = Environment::with_enclosing(Rc::clone(&self.closure));
        env.define("this", Value::Instance(instance));

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: env.into_ref(),
            is_constructor: self.is_constructor,
        }
    }

    /// Run the body in a fresh scope under the closure (never the caller's
    /// scope).  A `return` stops here; constructors always yield `this`.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> IResult<Value> {
        let mut env = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            debug!("Binding parameter '{}' to {}", param.lexeme, argument);
            env.define(&param.lexeme, argument);
        }

        let returned = match interpreter.execute_block(&self.declaration.body, env.into_ref()) {
            Ok(()) => Value::Nil,
            Err(InterpretError::Return { value, .. }) => value,
            Err(e) => return Err(e),
        };

        if self.is_constructor {
            return Ok(self.closure.borrow().get_local("this").unwrap_or(Value::Nil));
        }

        info!("Function '{}' returned: {}", self.name(), returned);

        Ok(returned)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
