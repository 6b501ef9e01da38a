use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope.  Closures, call frames and the interpreter all
/// hold these, so a scope lives as long as anything still points at it.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope: its own bindings plus a link to the enclosing scope.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Create or overwrite a binding in this scope.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up here, then along the enclosing chain.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Overwrite the nearest existing binding of `name`.  Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Direct lookup in this scope only.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}

/// Walk exactly `distance` enclosing links up from `env`.  `None` when the
/// chain is shorter than that.
pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
    let mut current: EnvRef = Rc::clone(env);

    for _ in 0..distance {
        let next = current.borrow().enclosing()?;
        current = next;
    }

    Some(current)
}

/// Resolver-guided read: the scope `distance` links up, and only that scope.
pub fn get_at(env: &EnvRef, distance: usize, name: &str) -> Option<Value> {
    let value = ancestor(env, distance)?.borrow().get_local(name);
    debug!("get_at({}, '{}') -> {:?}", distance, name, value.is_some());
    value
}

/// Resolver-guided write: overwrite `name` in the scope `distance` links up.
/// Returns `false` when that scope does not exist.
pub fn assign_at(env: &EnvRef, distance: usize, name: &str, value: Value) -> bool {
    match ancestor(env, distance) {
        Some(target) => {
            target.borrow_mut().define(name, value);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenType};

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn get_walks_the_enclosing_chain() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));
        let inner = Environment::with_enclosing(Rc::clone(&global)).into_ref();

        let value = inner.borrow().get(&ident("a")).unwrap();
        assert_eq!(value, Value::Number(1.0));
    }

    #[test]
    fn assign_updates_nearest_binding_without_defining() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));
        let inner = Environment::with_enclosing(Rc::clone(&global)).into_ref();

        inner
            .borrow_mut()
            .assign(&ident("a"), Value::Number(2.0))
            .unwrap();

        assert_eq!(inner.borrow().get_local("a"), None);
        assert_eq!(global.borrow().get_local("a"), Some(Value::Number(2.0)));
    }

    #[test]
    fn assign_to_missing_name_is_undefined_variable() {
        let global = Environment::new().into_ref();
        let err = global
            .borrow_mut()
            .assign(&ident("nope"), Value::Nil)
            .unwrap_err();

        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name, .. } if name == "nope"));
    }

    #[test]
    fn get_at_does_not_search_past_target_scope() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));
        let middle = Environment::with_enclosing(Rc::clone(&global)).into_ref();
        let inner = Environment::with_enclosing(Rc::clone(&middle)).into_ref();

        assert_eq!(get_at(&inner, 2, "a"), Some(Value::Number(1.0)));
        assert_eq!(get_at(&inner, 1, "a"), None);
        assert_eq!(get_at(&inner, 5, "a"), None);
    }

    #[test]
    fn assign_at_writes_the_target_scope() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));
        let inner = Environment::with_enclosing(Rc::clone(&global)).into_ref();
        inner.borrow_mut().define("a", Value::Number(10.0));

        assert!(assign_at(&inner, 1, "a", Value::Number(3.0)));
        assert_eq!(global.borrow().get_local("a"), Some(Value::Number(3.0)));
        assert_eq!(inner.borrow().get_local("a"), Some(Value::Number(10.0)));
    }
}
