use std::collections::HashMap;

use crate::ast::{Expr, Stmt};
use crate::error::ResolveError;
use crate::interpreter::Interpreter;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
}

/// Static analysis pass that computes, for every variable use, how many
/// scopes lie between the use and its definition, and hands that distance
/// to the interpreter. Walks the same tree the interpreter will walk;
/// the two must agree on scoping or `Environment::get_at` will panic.
pub struct Resolver<'i> {
    interpreter: &'i mut Interpreter,
    // name -> "fully initialized" flag; declared-but-not-defined is false
    scopes: Vec<HashMap<String, bool>>,
    errors: Vec<ResolveError>,
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'i> Resolver<'i> {
    pub fn new(interpreter: &'i mut Interpreter) -> Self {
        Self {
            interpreter,
            scopes: vec![],
            errors: vec![],
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// Resolve a whole program. Errors don't stop the pass; everything
    /// found is returned so one run can surface several of them.
    pub fn resolve(&mut self, statements: &[Stmt]) -> Result<(), Vec<ResolveError>> {
        self.resolve_stmts(statements);

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn resolve_stmts<I, R>(&mut self, statements: I)
    where
        I: IntoIterator<Item = R>,
        R: AsRef<Stmt>,
    {
        for stmt in statements {
            self.resolve_stmt(stmt.as_ref());
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block { statements } => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }
            Stmt::Var { name, initializer } => {
                // Three steps so the initializer can't read the variable
                // it is initializing: declare -> resolve -> define.
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(name);
            }
            Stmt::Function { name, params, body } => {
                // Declared and defined before the body so the function
                // can call itself recursively.
                self.declare(name);
                self.define(name);
                self.resolve_function(params, body, FunctionType::Function);
            }
            Stmt::Class { name, methods } => {
                let enclosing_class = self.current_class;
                self.current_class = ClassType::Class;

                self.declare(name);
                self.define(name);

                self.begin_scope();
                self.scope_insert("this");

                for method in methods {
                    match method {
                        Stmt::Function { name, params, body } => {
                            // 'init' is special by name alone.
                            let func_type = if name.lexeme == "init" {
                                FunctionType::Initializer
                            } else {
                                FunctionType::Method
                            };
                            self.resolve_function(params, body, func_type);
                        }
                        _ => unreachable!("class bodies contain only method declarations"),
                    }
                }

                self.end_scope();
                self.current_class = enclosing_class;
            }
            Stmt::Expression { expr } => self.resolve_expr(expr),
            Stmt::Print { expr } => self.resolve_expr(expr),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(stmt) = else_branch {
                    self.resolve_stmt(stmt);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(expr);
                }
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable { name, .. } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.error(name, "Can't read local variable in its own initializer.");
                    }
                }

                self.resolve_local(expr, name);
            }
            Expr::Assignment { name, value, .. } => {
                self.resolve_expr(value);
                self.resolve_local(expr, name);
            }
            Expr::This { keyword, .. } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, "Can't use 'this' outside of a class.");
                    return;
                }

                self.resolve_local(expr, keyword);
            }
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { object, .. } => {
                // Properties are dynamic; only the owner expression is
                // resolved.
                self.resolve_expr(object);
            }
            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }
            Expr::Grouping { expr } => self.resolve_expr(expr),
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Literal { .. } => {}
        }
    }

    fn resolve_function(&mut self, params: &[Token], body: &[std::rc::Rc<Stmt>], func_type: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = func_type;

        self.begin_scope();
        for param in params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    /// Record the distance to the innermost scope that knows `name`.
    /// Not found in any scope means the variable is (or will be) a
    /// global; no distance is recorded and the interpreter falls back to
    /// the global environment.
    fn resolve_local(&mut self, expr: &Expr, name: &Token) {
        for (i, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(&name.lexeme) {
                let distance = self.scopes.len() - 1 - i;
                self.interpreter.resolve(expr, distance);
                return;
            }
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            // Global scope: redeclaration is allowed there.
            return;
        };

        if scope.contains_key(&name.lexeme) {
            let e = ResolveError::new(
                name.clone(),
                "Already a variable with this name in this scope.",
            );
            self.errors.push(e);
            return;
        }

        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn scope_insert(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_owned(), true);
        }
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.errors.push(ResolveError::new(token.clone(), message));
    }
}
