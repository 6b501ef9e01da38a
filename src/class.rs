use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::Callable;
use crate::error::RuntimeError;
use crate::function::Function;
use crate::interpreter::{IResult, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Name of the method that runs when a class is called.
pub const CONSTRUCTOR: &str = "ctor";

pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(
        name: String,
        superclass: Option<Rc<Class>>,
        methods: HashMap<String, Rc<Function>>,
    ) -> Self {
        Class {
            name,
            superclass,
            methods,
        }
    }

    /// Look in this class, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self.superclass.as_ref()?.find_method(name),
        }
    }

    /// Constructor arity, or zero without a constructor.
    pub fn arity(&self) -> usize {
        self.find_method(CONSTRUCTOR).map_or(0, |ctor| ctor.arity())
    }

    /// Allocate an instance and run the constructor (if any) bound to it.
    pub fn call(
        class: &Rc<Class>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> IResult<Value> {
        let instance: InstanceRef = Rc::new(RefCell::new(Instance::new(Rc::clone(class))));

        if let Some(ctor) = class.find_method(CONSTRUCTOR) {
            debug!("Running constructor of '{}'", class.name);
            ctor.bind(Rc::clone(&instance)).call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub type InstanceRef = Rc<RefCell<Instance>>;

/// A runtime object.  Fields spring into existence on first assignment.
pub struct Instance {
    class: Rc<Class>,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance {
            class,
            fields: HashMap::new(),
        }
    }

    /// Fields shadow methods; methods come back bound to `instance`.
    pub fn get(instance: &InstanceRef, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = instance.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        let method = instance.borrow().class.find_method(&name.lexeme);

        match method {
            Some(method) => {
                let bound = method.bind(Rc::clone(instance));
                Ok(Value::Callable(Callable::Function(Rc::new(bound))))
            }
            None => Err(RuntimeError::undefined_property(name)),
        }
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
