use rlox::prelude::*;

fn token_types(source: &str) -> Vec<TokenType> {
    let mut scanner = Scanner::new(source);
    let (tokens, errors) = scanner.scan_tokens();
    assert!(errors.is_empty(), "scan errors: {errors:?}");
    tokens.into_iter().map(|t| t.token_type).collect()
}

#[test]
fn one_plus_two() {
    let mut scanner = Scanner::new("1+2");
    let (tokens, errors) = scanner.scan_tokens();
    assert!(errors.is_empty());

    let types: Vec<_> = tokens.iter().map(|t| t.token_type.clone()).collect();
    assert_eq!(
        types,
        vec![
            TokenType::Number,
            TokenType::Plus,
            TokenType::Number,
            TokenType::EOF
        ]
    );
    assert_eq!(tokens[0].literal, Some(Object::Number(1.0)));
    assert_eq!(tokens[2].literal, Some(Object::Number(2.0)));
}

#[test]
fn empty_input_yields_only_eof() {
    assert_eq!(token_types(""), vec![TokenType::EOF]);
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        token_types("class classy"),
        vec![TokenType::Class, TokenType::Identifier, TokenType::EOF]
    );
    assert_eq!(
        token_types("var _x1 = nil;"),
        vec![
            TokenType::Var,
            TokenType::Identifier,
            TokenType::Equal,
            TokenType::Nil,
            TokenType::Semicolon,
            TokenType::EOF
        ]
    );
}

#[test]
fn two_character_operators() {
    assert_eq!(
        token_types("== != <= >= = ! < >"),
        vec![
            TokenType::EqualEqual,
            TokenType::BangEqual,
            TokenType::LessEqual,
            TokenType::GreaterEqual,
            TokenType::Equal,
            TokenType::Bang,
            TokenType::Less,
            TokenType::Greater,
            TokenType::EOF
        ]
    );
}

#[test]
fn comments_are_discarded() {
    assert_eq!(
        token_types("// nothing to see\n1"),
        vec![TokenType::Number, TokenType::EOF]
    );
}

#[test]
fn string_spans_lines_and_keeps_raw_text() {
    let mut scanner = Scanner::new("\"a\nb\"");
    let (tokens, errors) = scanner.scan_tokens();
    assert!(errors.is_empty());

    assert_eq!(tokens[0].token_type, TokenType::StringLiteral);
    assert_eq!(tokens[0].literal, Some(Object::String("a\nb".to_owned())));
    // The line counter advanced past the embedded newline.
    assert_eq!(tokens[0].line, 2);
}

#[test]
fn number_without_trailing_digits_is_not_fractional() {
    // "3." scans as NUMBER(3) followed by DOT.
    assert_eq!(
        token_types("3."),
        vec![TokenType::Number, TokenType::Dot, TokenType::EOF]
    );

    let mut scanner = Scanner::new("3.14");
    let (tokens, _) = scanner.scan_tokens();
    assert_eq!(tokens[0].literal, Some(Object::Number(3.14)));
}

#[test]
fn unexpected_character_is_reported_and_scanning_continues() {
    let mut scanner = Scanner::new("@ 1");
    let (tokens, errors) = scanner.scan_tokens();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Unexpected character.");
    assert_eq!(errors[0].line, 1);

    // The number after the bad character was still scanned.
    let types: Vec<_> = tokens.into_iter().map(|t| t.token_type).collect();
    assert_eq!(types, vec![TokenType::Number, TokenType::EOF]);
}

#[test]
fn unterminated_string_is_reported() {
    let mut scanner = Scanner::new("\"abc");
    let (tokens, errors) = scanner.scan_tokens();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Unterminated string.");
    assert_eq!(
        tokens.into_iter().map(|t| t.token_type).collect::<Vec<_>>(),
        vec![TokenType::EOF]
    );
}

#[test]
fn line_numbers_advance() {
    let mut scanner = Scanner::new("1\n2\n3");
    let (tokens, _) = scanner.scan_tokens();
    let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![1, 2, 3, 3]);
}
