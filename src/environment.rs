use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// One scope in the chain. The chain links each block or call scope to
/// its enclosing scope, out to the globals. Scopes are shared behind
/// `Rc<RefCell<_>>` because every closure capturing a scope must see
/// later mutations through the same binding.
#[derive(Debug, Default)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, Object>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(self, enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            enclosing: Some(enclosing),
            ..Default::default()
        }
    }

    pub fn as_shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Always succeeds, shadowing a same-named binding in this scope only.
    pub fn define(&mut self, name: &str, value: Object) {
        self.values.insert(name.to_owned(), value);
    }

    /// Assign to an existing binding, searching outward through the chain.
    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if !self.values.contains_key(&name.lexeme) {
            if let Some(ref e) = self.enclosing {
                return e.borrow_mut().assign(name, value);
            }

            return Err(undefined_variable(name));
        }

        self.values.insert(name.lexeme.clone(), value);
        Ok(())
    }

    /// Look a binding up, searching outward through the chain.
    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(ref e) = self.enclosing {
            return e.borrow().get(name);
        }

        Err(undefined_variable(name))
    }

    /// Read a binding exactly `distance` scopes out, with no search. This
    /// is the fast path used once the resolver has supplied a distance;
    /// a miss here means the resolver and interpreter disagree about
    /// scoping, which is a bug in the interpreter, not a user error.
    pub fn get_at(&self, distance: usize, name: &str) -> Object {
        if distance == 0 {
            return self
                .values
                .get(name)
                .cloned()
                .unwrap_or_else(|| scope_defect(name, distance));
        }

        self.ancestor(distance, name)
            .borrow()
            .values
            .get(name)
            .cloned()
            .unwrap_or_else(|| scope_defect(name, distance))
    }

    /// Write a binding exactly `distance` scopes out. Same contract as
    /// `get_at`: the binding must exist there.
    pub fn assign_at(&mut self, distance: usize, name: &str, value: Object) {
        if distance == 0 {
            match self.values.get_mut(name) {
                Some(slot) => *slot = value,
                None => scope_defect(name, distance),
            }
            return;
        }

        let ancestor = self.ancestor(distance, name);
        let mut ancestor = ancestor.borrow_mut();
        match ancestor.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => scope_defect(name, distance),
        }
    }

    fn ancestor(&self, distance: usize, name: &str) -> Rc<RefCell<Environment>> {
        let mut env = match self.enclosing {
            Some(ref e) => e.clone(),
            None => scope_defect(name, distance),
        };

        for _ in 1..distance {
            let parent = match env.borrow().enclosing {
                Some(ref e) => e.clone(),
                None => scope_defect(name, distance),
            };
            env = parent;
        }

        env
    }
}

fn undefined_variable(name: &Token) -> RuntimeError {
    RuntimeError::UndefinedVariable {
        name: name.clone(),
        message: format!("Undefined variable '{}'.", name.lexeme),
    }
}

// Walking off the chain (or missing the binding at the target scope) can
// only happen if the resolver recorded a distance the interpreter's
// environment chain doesn't match. That is an internal defect, never a
// user-facing runtime error.
fn scope_defect(name: &str, distance: usize) -> ! {
    panic!("resolved variable '{name}' not found at scope distance {distance}")
}
