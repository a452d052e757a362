use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use crate::ast::Stmt;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::{Control, Interpreter};
use crate::object::{Callable, Object};
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct LoxFunction {
    name: Token,
    params: Vec<Token>,
    body: Vec<Rc<Stmt>>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        name: Token,
        params: Vec<Token>,
        body: &[Rc<Stmt>],
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            name,
            params,
            body: body.to_vec(),
            closure,
            is_initializer,
        }
    }

    /// A copy of this function whose closure has exactly one extra
    /// binding, `this -> instance`. The original is untouched.
    pub fn bind(&self, instance: Object) -> Rc<LoxFunction> {
        let env = Environment::new()
            .with_enclosing(self.closure.clone())
            .as_shared();
        env.borrow_mut().define("this", instance);

        Rc::new(LoxFunction::new(
            self.name.clone(),
            self.params.clone(),
            &self.body,
            env,
            self.is_initializer,
        ))
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Object>,
    ) -> Result<Object, RuntimeError> {
        // One fresh child of the closure per invocation. Never reused:
        // recursion and simultaneously-live closures each get their own
        // parameter bindings.
        let environment = Environment::new()
            .with_enclosing(self.closure.clone())
            .as_shared();

        {
            let mut env = environment.borrow_mut();
            for (param, arg) in self.params.iter().zip(arguments) {
                env.define(param.lexeme.as_str(), arg);
            }
        }

        // The call boundary is the only place a Return signal is consumed.
        let control = interpreter.execute_block(&self.body, environment)?;

        if self.is_initializer {
            // An initializer yields the bound instance no matter how the
            // body finished; 'this' sits at distance 0 in the closure
            // created by bind().
            return Ok(self.closure.borrow().get_at(0, "this"));
        }

        match control {
            Control::Return(value) => Ok(value),
            Control::Normal => Ok(Object::Null),
        }
    }
}

impl Display for LoxFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name.lexeme)
    }
}
