use rlox::prelude::*;

fn parse(source: &str) -> Result<Vec<Stmt>, Vec<ParseError>> {
    let mut scanner = Scanner::new(source);
    let (tokens, errors) = scanner.scan_tokens();
    assert!(errors.is_empty(), "scan errors: {errors:?}");

    let mut parser = Parser::new(tokens);
    parser.parse()
}

fn parse_expression(source: &str) -> Expr {
    let stmt = parse(source)
        .expect("failed to parse the source")
        .pop()
        .expect("no statement was created");

    match stmt {
        Stmt::Expression { expr } => expr,
        _ => panic!("statement is not an expression"),
    }
}

fn printed(source: &str) -> String {
    AstPrinter::print(&parse_expression(source))
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(printed("1 + 2 * 3;"), "(+ 1 (* 2 3))");
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(printed("(1 + 2) * 3;"), "(* (group (+ 1 2)) 3)");
}

#[test]
fn unary_binds_tighter_than_factor() {
    assert_eq!(printed("-1 * 2;"), "(* (- 1) 2)");
}

#[test]
fn comparison_binds_tighter_than_equality() {
    assert_eq!(printed("1 < 2 == true;"), "(== (< 1 2) true)");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(printed("a = b = 1;"), "(= a (= b 1))");
}

#[test]
fn property_access_chains_left_to_right() {
    assert_eq!(printed("a.b.c;"), "(. (. a b) c)");
}

#[test]
fn assignment_to_property_becomes_set() {
    assert_eq!(printed("a.b = 1;"), "(= (. a b) 1)");
}

#[test]
fn calls_chain() {
    assert_eq!(printed("f(1)(2);"), "(call (call f 1) 2)");
    assert_eq!(printed("f().g;"), "(. (call f) g)");
}

#[test]
fn logical_operators_nest_by_precedence() {
    // 'and' binds tighter than 'or'.
    assert_eq!(printed("a or b and c;"), "(or a (and b c))");
}

#[test]
fn invalid_assignment_target_is_reported() {
    let errors = parse("1 = 2;").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Invalid assignment target.");
}

#[test]
fn recovery_surfaces_multiple_errors_in_one_pass() {
    let errors = parse("var = 1;\nvar = 2;").unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].token.line, 1);
    assert_eq!(errors[1].token.line, 2);
}

#[test]
fn recovery_does_not_drop_later_statements() {
    // The bad declaration is skipped; the trailing one still parses, so
    // only one error shows up.
    let errors = parse("var = 1;\nprint 2;").unwrap_err();
    assert_eq!(errors.len(), 1);
}

#[test]
fn for_desugars_into_block_and_while() {
    let stmts = parse("for (var i = 0; i < 3; i = i + 1) print i;").unwrap();
    assert_eq!(stmts.len(), 1);

    let Stmt::Block { statements } = &stmts[0] else {
        panic!("for should desugar to a block");
    };
    assert!(matches!(statements[0], Stmt::Var { .. }));

    let Stmt::While { body, .. } = &statements[1] else {
        panic!("second element should be the while loop");
    };
    let Stmt::Block { statements: inner } = body.as_ref() else {
        panic!("loop body should wrap the increment");
    };
    assert!(matches!(inner[0], Stmt::Print { .. }));
    assert!(matches!(inner[1], Stmt::Expression { .. }));
}

#[test]
fn class_bodies_are_method_lists() {
    let stmts = parse("class A { f() { return 1; } g(x) {} }").unwrap();

    let Stmt::Class { name, methods } = &stmts[0] else {
        panic!("expected a class declaration");
    };
    assert_eq!(name.lexeme, "A");
    assert_eq!(methods.len(), 2);
    assert!(matches!(methods[0], Stmt::Function { .. }));
}

#[test]
fn return_without_value_parses() {
    let stmts = parse("fun f() { return; }").unwrap();
    let Stmt::Function { body, .. } = &stmts[0] else {
        panic!("expected a function declaration");
    };
    assert!(matches!(
        body[0].as_ref(),
        Stmt::Return { value: None, .. }
    ));
}

#[test]
fn variable_nodes_get_fresh_identities_per_parse() {
    // Identities key the interpreter's distance table across a whole
    // session, so two parses of the same source must never collide.
    let first = parse_expression("x;");
    let second = parse_expression("x;");
    assert_ne!(first.id(), second.id());
}

#[test]
fn error_at_end_of_input() {
    let errors = parse("print 1").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].token.token_type, TokenType::EOF);
    assert!(errors[0].to_string().contains("at end"));
}
