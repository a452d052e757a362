use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::object::Object;
use crate::token::Token;

/// Identity of a variable-reference node, stamped at parse time from a
/// process-wide counter. Ids are never reused, so a distance recorded
/// for one program can't be picked up by a node of a later one. A REPL
/// interleaves parsing and execution across many short-lived trees, and
/// closures keep earlier trees' bodies alive, so anything tied to an
/// allocation (like the node's address) would not be unique enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn next() -> NodeId {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        NodeId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: Token,
    },
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    This {
        keyword: Token,
        id: NodeId,
    },
    Grouping {
        expr: Box<Expr>,
    },
    Literal {
        value: Object,
    },
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Variable {
        name: Token,
        id: NodeId,
    },
    Assignment {
        name: Token,
        value: Box<Expr>,
        id: NodeId,
    },
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Only the three resolvable node kinds carry an identity.
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Variable { id, .. } | Expr::Assignment { id, .. } | Expr::This { id, .. } => *id,
            _ => unreachable!("only variable references carry identities"),
        }
    }

    pub fn number_literal(v: f64) -> Expr {
        Expr::Literal {
            value: Object::Number(v),
        }
    }

    pub fn string_literal(s: &str) -> Expr {
        Expr::Literal {
            value: Object::String(s.to_owned()),
        }
    }
}

#[derive(Debug)]
pub enum Stmt {
    Expression {
        expr: Expr,
    },
    Print {
        expr: Expr,
    },
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block {
        statements: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    // The body is shared with every closure created from this declaration.
    Function {
        name: Token,
        params: Vec<Token>,
        body: Vec<Rc<Stmt>>,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Class {
        name: Token,
        methods: Vec<Stmt>,
    },
}

impl AsRef<Stmt> for Stmt {
    fn as_ref(&self) -> &Stmt {
        self
    }
}
