mod ast;
mod class;
mod environment;
mod error;
mod func;
mod interpreter;
mod native;
mod object;
mod parser;
mod printer;
mod resolver;
mod scanner;
mod token;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::class::*;
    pub use crate::environment::Environment;
    pub use crate::error::*;
    pub use crate::func::*;
    pub use crate::interpreter::*;
    pub use crate::object::*;
    pub use crate::parser::*;
    pub use crate::printer::AstPrinter;
    pub use crate::resolver::Resolver;
    pub use crate::scanner::*;
    pub use crate::token::*;
    pub use crate::Shared;
}

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use log::debug;

use error::{ParseError, ResolveError, RuntimeError, ScanError};
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

pub type Shared<T> = Rc<RefCell<T>>;
pub type SharedErrorReporter = Shared<ErrorReporter>;

pub struct Lox {
    interpreter: Interpreter,
    error_reporter: SharedErrorReporter,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Self {
        let error_reporter = Rc::new(RefCell::new(ErrorReporter::default()));

        Self {
            interpreter: Interpreter::new().with_error_reporting(error_reporter.clone()),
            error_reporter,
        }
    }

    /// True if a scan, parse, or resolve error has been reported.
    pub fn had_error(&self) -> bool {
        self.error_reporter.borrow().had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.error_reporter.borrow().had_runtime_error
    }

    pub fn run_file(&mut self, filename: &str) -> Result<(), anyhow::Error> {
        let content = std::fs::read_to_string(filename)?;
        self.run(content.as_ref())
    }

    /// The interactive loop: one line is one program run. Error flags are
    /// reset between lines so a mistake doesn't poison the session.
    pub fn run_prompt(&mut self) -> Result<(), anyhow::Error> {
        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };

            self.run(&line?)?;
            self.error_reporter.borrow_mut().reset();
        }

        Ok(())
    }

    /// Run one program: scan, parse, resolve, interpret. Each stage's
    /// errors are reported and suppress everything downstream.
    pub fn run(&mut self, input: &str) -> Result<(), anyhow::Error> {
        let mut scanner = Scanner::new(input);
        let (tokens, scan_errors) = scanner.scan_tokens();
        debug!("scanned {} tokens", tokens.len());

        if !scan_errors.is_empty() {
            self.report_scan_errors(scan_errors);
            return Ok(());
        }

        let mut parser = Parser::new(tokens);
        let statements = match parser.parse() {
            Ok(stmts) => stmts,
            Err(errors) => {
                self.report_parse_errors(errors);
                return Ok(());
            }
        };
        debug!("parsed {} statements", statements.len());

        let mut resolver = Resolver::new(&mut self.interpreter);
        if let Err(errors) = resolver.resolve(&statements) {
            self.report_resolve_errors(errors);
            return Ok(());
        }

        self.interpreter.interpret(&statements);

        Ok(())
    }

    fn report_scan_errors(&mut self, errors: Vec<ScanError>) {
        let mut reporter = self.error_reporter.borrow_mut();
        for e in errors {
            reporter.scan_error(&e);
        }
    }

    fn report_parse_errors(&mut self, errors: Vec<ParseError>) {
        let mut reporter = self.error_reporter.borrow_mut();
        for e in errors {
            reporter.parse_error(&e);
        }
    }

    fn report_resolve_errors(&mut self, errors: Vec<ResolveError>) {
        let mut reporter = self.error_reporter.borrow_mut();
        for e in errors {
            reporter.resolve_error(&e);
        }
    }
}

/// Collects the "did anything go wrong" flags and writes diagnostics to
/// stderr. Shared between the pipeline driver and the interpreter.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl ErrorReporter {
    pub fn scan_error(&mut self, e: &ScanError) {
        eprintln!("{e}");
        self.had_error = true;
    }

    pub fn parse_error(&mut self, e: &ParseError) {
        eprintln!("{e}");
        self.had_error = true;
    }

    pub fn resolve_error(&mut self, e: &ResolveError) {
        eprintln!("{e}");
        self.had_error = true;
    }

    pub fn runtime_error(&mut self, e: &RuntimeError) {
        eprintln!("{e}");
        self.had_runtime_error = true;
    }

    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}
