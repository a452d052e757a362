use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::ast::{Expr, NodeId, Stmt};
use crate::class::LoxClass;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::func::LoxFunction;
use crate::native;
use crate::object::Object;
use crate::token::{Token, TokenType};
use crate::SharedErrorReporter;

/// How a statement finished. A `Return` travels up through blocks and
/// loops untouched; only the function-call boundary consumes it. Runtime
/// errors use the `Err` channel of the surrounding `Result` and can never
/// be mistaken for a return.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Normal,
    Return(Object),
}

type EvalResult = Result<Object, RuntimeError>;
type ExecResult = Result<Control, RuntimeError>;

pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    // node id -> scope distance, written by the resolver before any
    // statement executes, read-only afterwards
    locals: HashMap<NodeId, usize>,
    error_reporter: Option<SharedErrorReporter>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new().as_shared();
        let environment = globals.clone();

        globals
            .borrow_mut()
            .define("clock", Object::Callable(native::clock()));

        Self {
            globals,
            environment,
            locals: HashMap::new(),
            error_reporter: None,
        }
    }

    pub fn with_error_reporting(self, error_reporter: SharedErrorReporter) -> Self {
        Self {
            error_reporter: Some(error_reporter),
            ..self
        }
    }

    /// Called by the resolver for every variable use it bound lexically.
    pub fn resolve(&mut self, expr: &Expr, depth: usize) {
        self.locals.insert(expr.id(), depth);
    }

    /// Execute top-level statements in order. The first runtime error is
    /// reported and aborts the rest of this run; the caller (e.g. a REPL)
    /// decides whether to start another run.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            if let Err(e) = self.execute(stmt) {
                debug!("runtime error, aborting run: {e}");
                self.report_runtime_error(e);
                return;
            }
        }
    }

    pub fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Expression { expr } => {
                self.evaluate_expr(expr)?;
                Ok(Control::Normal)
            }
            Stmt::Print { expr } => {
                let value = self.evaluate_expr(expr)?;
                println!("{value}");
                Ok(Control::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Object::Null,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Control::Normal)
            }
            Stmt::Block { statements } => {
                let new_env = Environment::new()
                    .with_enclosing(self.environment.clone())
                    .as_shared();

                self.execute_block(statements, new_env)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.evaluate_expr(condition)?;

                if is_truthy(&condition) {
                    self.execute(then_branch)
                } else if let Some(stmt) = else_branch {
                    self.execute(stmt)
                } else {
                    Ok(Control::Normal)
                }
            }
            Stmt::While { condition, body } => {
                loop {
                    let condition = self.evaluate_expr(condition)?;
                    if !is_truthy(&condition) {
                        break;
                    }

                    // A return inside the body ends the loop too.
                    if let Control::Return(value) = self.execute(body)? {
                        return Ok(Control::Return(value));
                    }
                }

                Ok(Control::Normal)
            }
            Stmt::Function { name, params, body } => {
                // The closure is the environment active at the point of
                // declaration, not at the point of any later call.
                let function = LoxFunction::new(
                    name.clone(),
                    params.to_vec(),
                    body,
                    self.environment.clone(),
                    false,
                );
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Object::Callable(Rc::new(function)));
                Ok(Control::Normal)
            }
            Stmt::Return { keyword: _, value } => {
                let value = match value {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Object::Null,
                };

                Ok(Control::Return(value))
            }
            Stmt::Class { name, methods } => {
                // Two-step binding: the name exists (as nil) while the
                // methods are being closed over, then the finished class
                // is assigned into the same slot.
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Object::Null);

                let mut method_map = HashMap::new();
                for method in methods {
                    match method {
                        Stmt::Function { name, params, body } => {
                            let is_initializer = name.lexeme == "init";
                            let function = LoxFunction::new(
                                name.clone(),
                                params.to_vec(),
                                body,
                                self.environment.clone(),
                                is_initializer,
                            );
                            method_map.insert(name.lexeme.clone(), Rc::new(function));
                        }
                        _ => unreachable!("class bodies contain only method declarations"),
                    }
                }

                let class = Rc::new(LoxClass::new(&name.lexeme, method_map));
                self.environment
                    .borrow_mut()
                    .assign(name, Object::Class(class))?;
                Ok(Control::Normal)
            }
        }
    }

    /// Run statements inside `environment`, restoring the previous one on
    /// every way out: completion, return, or error.
    pub fn execute_block<I, R>(
        &mut self,
        statements: I,
        environment: Rc<RefCell<Environment>>,
    ) -> ExecResult
    where
        I: IntoIterator<Item = R>,
        R: AsRef<Stmt>,
    {
        let prev_env = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(Control::Normal);
        for stmt in statements {
            match self.execute(stmt.as_ref()) {
                Ok(Control::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = prev_env;
        result
    }

    pub fn evaluate_expr(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Literal { value } => Ok(value.clone()),
            Expr::Grouping { expr: inner } => self.evaluate_expr(inner),
            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),
            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_value = self.evaluate_expr(left)?;

                // Short-circuit, yielding the operand itself rather than
                // a boolean.
                if operator.token_type == TokenType::Or {
                    if is_truthy(&left_value) {
                        return Ok(left_value);
                    }
                } else if !is_truthy(&left_value) {
                    return Ok(left_value);
                }

                self.evaluate_expr(right)
            }
            Expr::Variable { name, .. } => self.lookup_variable(name, expr),
            Expr::This { keyword, .. } => self.lookup_variable(keyword, expr),
            Expr::Assignment { name, value, .. } => {
                let value = self.evaluate_expr(value)?;

                if let Some(&distance) = self.locals.get(&expr.id()) {
                    self.environment
                        .borrow_mut()
                        .assign_at(distance, &name.lexeme, value.clone());
                } else {
                    self.globals.borrow_mut().assign(name, value.clone())?;
                }

                Ok(value)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),
            Expr::Get { object, name } => {
                let object = self.evaluate_expr(object)?;
                if let Object::Instance(ref instance) = object {
                    instance.borrow().get(name, &object)
                } else {
                    Err(RuntimeError::InvalidOperand {
                        operator: name.clone(),
                        message: "Only instances have properties.".to_owned(),
                    })
                }
            }
            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate_expr(object)?;

                if let Object::Instance(instance) = object {
                    let value = self.evaluate_expr(value)?;
                    instance.borrow_mut().set(name, value.clone());
                    Ok(value)
                } else {
                    Err(RuntimeError::InvalidOperand {
                        operator: name.clone(),
                        message: "Only instances have properties.".to_owned(),
                    })
                }
            }
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> EvalResult {
        let callee = self.evaluate_expr(callee)?;

        // Functions and classes share one calling convention: an arity
        // gate first, then the call itself.
        let arity = match &callee {
            Object::Callable(callable) => callable.arity(),
            Object::Class(class) => class.arity(),
            _ => {
                return Err(RuntimeError::InvalidOperand {
                    operator: paren.clone(),
                    message: "Can only call functions and classes.".to_owned(),
                })
            }
        };

        if arity != arguments.len() {
            return Err(RuntimeError::InvalidOperand {
                operator: paren.clone(),
                message: format!("Expected {} arguments but got {}.", arity, arguments.len()),
            });
        }

        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate_expr(arg)?);
        }

        match callee {
            Object::Callable(callable) => callable.call(self, args),
            Object::Class(class) => {
                LoxClass::construct(class, args, self).map(Object::Instance)
            }
            _ => unreachable!("arity gate only passes callables"),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> EvalResult {
        let value = self.evaluate_expr(right)?;
        match operator.token_type {
            TokenType::Minus => match value.number() {
                Some(n) => Ok(Object::Number(-n)),
                None => Err(RuntimeError::InvalidOperand {
                    operator: operator.clone(),
                    message: format!("Operand must be a number, but got {}.", value.type_name()),
                }),
            },
            TokenType::Bang => Ok(Object::Boolean(!is_truthy(&value))),
            _ => unreachable!("parser only emits '-' and '!' unary operators"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> EvalResult {
        let left_value = self.evaluate_expr(left)?;
        let right_value = self.evaluate_expr(right)?;

        match operator.token_type {
            TokenType::Plus => {
                if let (Some(l), Some(r)) = (left_value.number(), right_value.number()) {
                    Ok(Object::Number(l + r))
                } else if let (Some(l), Some(r)) = (left_value.string(), right_value.string()) {
                    Ok(Object::String(format!("{l}{r}")))
                } else {
                    Err(RuntimeError::InvalidOperand {
                        operator: operator.clone(),
                        message: format!(
                            "Operands must be two numbers or two strings, but got {} and {}.",
                            left_value.type_name(),
                            right_value.type_name()
                        ),
                    })
                }
            }
            TokenType::Minus => self
                .check_number_operands(operator, &left_value, &right_value)
                .map(|(l, r)| Object::Number(l - r)),
            TokenType::Star => self
                .check_number_operands(operator, &left_value, &right_value)
                .map(|(l, r)| Object::Number(l * r)),
            TokenType::Slash => self
                .check_number_operands(operator, &left_value, &right_value)
                .map(|(l, r)| Object::Number(l / r)),
            TokenType::Greater => self
                .check_number_operands(operator, &left_value, &right_value)
                .map(|(l, r)| Object::Boolean(l > r)),
            TokenType::GreaterEqual => self
                .check_number_operands(operator, &left_value, &right_value)
                .map(|(l, r)| Object::Boolean(l >= r)),
            TokenType::Less => self
                .check_number_operands(operator, &left_value, &right_value)
                .map(|(l, r)| Object::Boolean(l < r)),
            TokenType::LessEqual => self
                .check_number_operands(operator, &left_value, &right_value)
                .map(|(l, r)| Object::Boolean(l <= r)),

            // Value equality, no coercion; nil equals only nil.
            TokenType::EqualEqual => Ok(Object::Boolean(left_value == right_value)),
            TokenType::BangEqual => Ok(Object::Boolean(left_value != right_value)),

            _ => unreachable!("parser only emits arithmetic and comparison binary operators"),
        }
    }

    fn check_number_operands(
        &self,
        operator: &Token,
        left: &Object,
        right: &Object,
    ) -> Result<(f64, f64), RuntimeError> {
        if let (Some(l), Some(r)) = (left.number(), right.number()) {
            Ok((l, r))
        } else {
            Err(RuntimeError::InvalidOperand {
                operator: operator.clone(),
                message: format!(
                    "Operands must be numbers, but got {} and {}.",
                    left.type_name(),
                    right.type_name()
                ),
            })
        }
    }

    /// The two-path lookup: a recorded distance walks exactly that many
    /// scopes; no entry means the variable lives (or will live) in the
    /// global environment.
    fn lookup_variable(&self, name: &Token, expr: &Expr) -> EvalResult {
        if let Some(&distance) = self.locals.get(&expr.id()) {
            Ok(self.environment.borrow().get_at(distance, &name.lexeme))
        } else {
            self.globals.borrow().get(name)
        }
    }

    fn report_runtime_error(&self, e: RuntimeError) {
        if let Some(reporter) = self.error_reporter.as_ref() {
            reporter.borrow_mut().runtime_error(&e);
        }
    }
}

fn is_truthy(value: &Object) -> bool {
    !matches!(value, Object::Null | Object::Boolean(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> Vec<Stmt> {
        let mut scanner = Scanner::new(source);
        let (tokens, errors) = scanner.scan_tokens();
        assert!(errors.is_empty(), "scan errors: {errors:?}");

        let mut parser = Parser::new(tokens);
        parser.parse().expect("failed to parse the source")
    }

    fn make_expression(source: &str) -> Expr {
        let stmt = parse(source).pop().expect("no statement was created");
        match stmt {
            Stmt::Expression { expr } => expr,
            _ => panic!("statement is not an expression"),
        }
    }

    fn run_resolved(interpreter: &mut Interpreter, source: &str) {
        let statements = parse(source);
        let mut resolver = Resolver::new(interpreter);
        resolver.resolve(&statements).expect("resolution failed");
        for stmt in &statements {
            interpreter.execute(stmt).expect("execution failed");
        }
    }

    macro_rules! assert_literal {
        ($source:literal, $expected:expr, $lit_type:path) => {
            let mut ipr = Interpreter::new();
            let expr = make_expression($source);
            let res = ipr.evaluate_expr(&expr);
            assert!(res.is_ok());
            assert_eq!(res.unwrap(), $lit_type($expected));
        };
    }

    macro_rules! assert_number {
        ($source:literal, $expected:expr) => {
            assert_literal!($source, $expected, Object::Number);
        };
    }

    macro_rules! assert_boolean {
        ($source:literal, $expected:expr) => {
            assert_literal!($source, $expected, Object::Boolean);
        };
    }

    #[test]
    fn unary_minus() {
        assert_number!("-3.14;", -3.14);
    }

    #[test]
    fn unary_bang_truthiness() {
        assert_boolean!("!true;", false);
        assert_boolean!("!nil;", true);
        // 0 and "" are truthy
        assert_boolean!("!0;", false);
        assert_boolean!("!\"\";", false);
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_number!("nil or 2;", 2.0);
        assert_number!("1 and 2;", 2.0);
        assert_number!("1 or 2;", 1.0);
        assert_literal!("false and 2;", false, Object::Boolean);
    }

    #[test]
    fn equality_has_no_coercion() {
        assert_boolean!("nil == nil;", true);
        assert_boolean!("nil == false;", false);
        assert_boolean!("0 == \"0\";", false);
        assert_boolean!("\"a\" == \"a\";", true);
    }

    #[test]
    fn plus_rejects_mixed_operands() {
        let mut ipr = Interpreter::new();
        let expr = make_expression("1 + true;");
        let err = ipr.evaluate_expr(&expr).unwrap_err();
        match err {
            RuntimeError::InvalidOperand { message, .. } => {
                assert!(message.contains("number"), "message: {message}");
                assert!(message.contains("boolean"), "message: {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn comparison_requires_numbers() {
        let mut ipr = Interpreter::new();
        let expr = make_expression("\"a\" < 1;");
        let err = ipr.evaluate_expr(&expr).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidOperand { .. }));
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let mut ipr = Interpreter::new();
        let expr = make_expression("missing;");
        let err = ipr.evaluate_expr(&expr).unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedVariable { .. }));
    }

    #[test]
    fn calling_a_non_callable_is_an_error() {
        let mut ipr = Interpreter::new();
        let expr = make_expression("\"not a function\"();");
        let err = ipr.evaluate_expr(&expr).unwrap_err();
        match err {
            RuntimeError::InvalidOperand { message, .. } => {
                assert_eq!(message, "Can only call functions and classes.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn class_arity_mismatch_is_an_error() {
        let mut ipr = Interpreter::new();
        run_resolved(
            &mut ipr,
            "class Point { init(x, y) { this.x = x; this.y = y; } }",
        );

        let expr = make_expression("Point(1);");
        // Resolve against no scopes: Point is global, falls through.
        let err = ipr.evaluate_expr(&expr).unwrap_err();
        match err {
            RuntimeError::InvalidOperand { message, .. } => {
                assert_eq!(message, "Expected 2 arguments but got 1.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn functions_return_values() {
        let mut ipr = Interpreter::new();
        run_resolved(&mut ipr, "fun add(a, b) { return a + b; }");

        let expr = make_expression("add(1, 2);");
        assert_eq!(ipr.evaluate_expr(&expr).unwrap(), Object::Number(3.0));
    }

    #[test]
    fn function_without_return_yields_nil() {
        let mut ipr = Interpreter::new();
        run_resolved(&mut ipr, "fun noop() { 1 + 1; }");

        let expr = make_expression("noop();");
        assert_eq!(ipr.evaluate_expr(&expr).unwrap(), Object::Null);
    }

    #[test]
    fn init_yields_the_instance_even_with_bare_return() {
        let mut ipr = Interpreter::new();
        run_resolved(
            &mut ipr,
            "class Thing { init() { this.ready = true; return; } } var t = Thing();",
        );

        let expr = make_expression("t.ready;");
        assert_eq!(ipr.evaluate_expr(&expr).unwrap(), Object::Boolean(true));
    }

    #[test]
    fn block_restores_environment_after_error() {
        let mut ipr = Interpreter::new();
        run_resolved(&mut ipr, "var a = 1;");

        // The block shadows 'a' and then fails; afterwards the outer 'a'
        // must still be reachable.
        let statements = parse("{ var a = 2; a + true; }");
        let mut resolver = Resolver::new(&mut ipr);
        resolver.resolve(&statements).unwrap();
        assert!(ipr.execute(&statements[0]).is_err());

        let expr = make_expression("a;");
        assert_eq!(ipr.evaluate_expr(&expr).unwrap(), Object::Number(1.0));
    }
}
