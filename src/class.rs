use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::func::LoxFunction;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::token::Token;

#[derive(Debug)]
pub struct LoxClass {
    name: String,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(name: impl AsRef<str>, methods: HashMap<String, Rc<LoxFunction>>) -> Self {
        Self {
            name: name.as_ref().to_owned(),
            methods,
        }
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        self.methods.get(name).cloned()
    }

    /// A class's arity is its initializer's arity; without an 'init'
    /// method it takes no arguments.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    /// Calling the class: create an instance, then run 'init' bound to it
    /// (if declared) with the caller's arguments. The bound initializer
    /// returns the instance itself, so its result can be dropped here.
    pub fn construct(
        class: Rc<LoxClass>,
        arguments: Vec<Object>,
        interpreter: &mut Interpreter,
    ) -> Result<Rc<RefCell<LoxInstance>>, RuntimeError> {
        let instance = Rc::new(RefCell::new(LoxInstance::new(class.clone())));

        if let Some(initializer) = class.find_method("init") {
            initializer
                .bind(Object::Instance(instance.clone()))
                .call(interpreter, arguments)?;
        }

        Ok(instance)
    }
}

impl Display for LoxClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug)]
pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Object>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// Property lookup: instance fields shadow class methods; a method
    /// hit is returned freshly bound to this instance.
    pub fn get(&self, name: &Token, instance: &Object) -> Result<Object, RuntimeError> {
        if let Some(value) = self.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = self.class.find_method(&name.lexeme) {
            return Ok(Object::Callable(method.bind(instance.clone())));
        }

        Err(RuntimeError::UndefinedProperty {
            name: name.clone(),
            message: format!("Undefined property '{}'.", name.lexeme),
        })
    }

    /// Field writes always succeed, create-or-overwrite.
    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl Display for LoxInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class)
    }
}
