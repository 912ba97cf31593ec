use super::*;
use crate::lexer::Lexer;
use crate::trace::RecordingTracer;
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn parse_ok(input: &str) -> Program {
    let (program, errors) = parse(Lexer::new(input));
    assert!(errors.is_empty(), "parser errors for {:?}: {:?}", input, errors);
    program
}

fn parse_errors(input: &str) -> Vec<String> {
    let (_, errors) = parse(Lexer::new(input));
    errors.iter().map(|e| e.to_string()).collect()
}

fn single_expression(input: &str) -> Expression {
    let program = parse_ok(input);
    assert_eq!(program.statements.len(), 1, "{:?}", program.statements);
    match program.statements.into_iter().next() {
        Some(Statement::Expression(expr)) => expr,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

fn ident(name: &str) -> Expression {
    Expression::Identifier(name.to_string())
}

fn infix(left: Expression, operator: Infix, right: Expression) -> Expression {
    Expression::Infix {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[test]
fn let_statements_parse_their_values() {
    let cases = [
        ("let x = 5;", "x", Expression::Integer(5)),
        ("let y = true;", "y", Expression::Boolean(true)),
        ("let foobar = y", "foobar", ident("y")),
        (
            "let z = a + 1;",
            "z",
            infix(ident("a"), Infix::Plus, Expression::Integer(1)),
        ),
    ];

    for (input, name, value) in cases {
        let program = parse_ok(input);
        assert_eq!(
            program.statements,
            vec![Statement::Let {
                name: name.to_string(),
                value,
            }]
        );
    }
}

#[test]
fn return_statements_parse_their_values() {
    let program = parse_ok("return 5; return x; return 2 * y");
    assert_eq!(
        program.statements,
        vec![
            Statement::Return(Expression::Integer(5)),
            Statement::Return(ident("x")),
            Statement::Return(infix(Expression::Integer(2), Infix::Asterisk, ident("y"))),
        ]
    );
}

#[test]
fn identifier_and_literals() {
    assert_eq!(single_expression("foobar;"), ident("foobar"));
    assert_eq!(single_expression("5;"), Expression::Integer(5));
    assert_eq!(single_expression("true"), Expression::Boolean(true));
    assert_eq!(single_expression("false;"), Expression::Boolean(false));
}

#[test]
fn prefix_expressions() {
    assert_eq!(
        single_expression("!5;"),
        Expression::Prefix {
            operator: Prefix::Bang,
            right: Box::new(Expression::Integer(5)),
        }
    );
    assert_eq!(
        single_expression("-foo"),
        Expression::Prefix {
            operator: Prefix::Minus,
            right: Box::new(ident("foo")),
        }
    );
    assert_eq!(
        single_expression("!true"),
        Expression::Prefix {
            operator: Prefix::Bang,
            right: Box::new(Expression::Boolean(true)),
        }
    );
}

#[test]
fn infix_expressions() {
    let cases = [
        ("5 + 5;", Infix::Plus),
        ("5 - 5;", Infix::Minus),
        ("5 * 5;", Infix::Asterisk),
        ("5 / 5;", Infix::Slash),
        ("5 > 5;", Infix::GreaterThan),
        ("5 < 5;", Infix::LessThan),
        ("5 == 5;", Infix::Equal),
        ("5 != 5;", Infix::NotEqual),
    ];
    for (input, operator) in cases {
        assert_eq!(
            single_expression(input),
            infix(Expression::Integer(5), operator, Expression::Integer(5))
        );
    }
    assert_eq!(
        single_expression("true != false"),
        infix(
            Expression::Boolean(true),
            Infix::NotEqual,
            Expression::Boolean(false)
        )
    );
}

#[test]
fn operator_precedence() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("3 + 4; -5 * 5", "(3 + 4); ((-5) * 5)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        (
            "3 + 4 * 5 == 3 * 1 + 4 * 5",
            "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))",
        ),
        ("true", "true"),
        ("3 > 5 == false", "((3 > 5) == false)"),
        ("3 < 5 == true", "((3 < 5) == true)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("2 / (5 + 5)", "(2 / (5 + 5))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        (
            "add(a + b + c * d / f + g)",
            "add((((a + b) + ((c * d) / f)) + g))",
        ),
    ];

    for (input, expected) in cases {
        assert_eq!(parse_ok(input).to_string(), expected, "input: {}", input);
    }
}

#[test]
fn if_expression() {
    assert_eq!(
        single_expression("if (x < y) { x }"),
        Expression::If {
            condition: Box::new(infix(ident("x"), Infix::LessThan, ident("y"))),
            consequence: BlockStatement {
                statements: vec![Statement::Expression(ident("x"))],
            },
            alternative: None,
        }
    );
}

#[test]
fn if_else_expression() {
    assert_eq!(
        single_expression("if (x < y) { x } else { y; }"),
        Expression::If {
            condition: Box::new(infix(ident("x"), Infix::LessThan, ident("y"))),
            consequence: BlockStatement {
                statements: vec![Statement::Expression(ident("x"))],
            },
            alternative: Some(BlockStatement {
                statements: vec![Statement::Expression(ident("y"))],
            }),
        }
    );
}

#[test]
fn function_literal() {
    assert_eq!(
        single_expression("fn(x, y) { x + y; }"),
        Expression::Function {
            parameters: vec!["x".to_string(), "y".to_string()],
            body: Rc::new(BlockStatement {
                statements: vec![Statement::Expression(infix(
                    ident("x"),
                    Infix::Plus,
                    ident("y")
                ))],
            }),
        }
    );
}

#[test]
fn function_parameters() {
    let cases: [(&str, &[&str]); 3] = [
        ("fn() {};", &[]),
        ("fn(x) {};", &["x"]),
        ("fn(x, y, z) {};", &["x", "y", "z"]),
    ];
    for (input, expected) in cases {
        match &single_expression(input) {
            Expression::Function { parameters, body } => {
                assert_eq!(*parameters, expected.to_vec());
                assert!(body.statements.is_empty());
            }
            other => panic!("expected function literal, got {:?}", other),
        }
    }
}

#[test]
fn call_expression() {
    assert_eq!(
        single_expression("add(1, 2 * 3, 4 + 5);"),
        Expression::Call {
            function: Box::new(ident("add")),
            arguments: vec![
                Expression::Integer(1),
                infix(Expression::Integer(2), Infix::Asterisk, Expression::Integer(3)),
                infix(Expression::Integer(4), Infix::Plus, Expression::Integer(5)),
            ],
        }
    );
    match &single_expression("fn(x) { x; }(5)") {
        Expression::Call { function, arguments } => {
            assert!(matches!(**function, Expression::Function { .. }));
            assert_eq!(*arguments, vec![Expression::Integer(5)]);
        }
        other => panic!("expected call, got {:?}", other),
    }
    match &single_expression("noop()") {
        Expression::Call { arguments, .. } => assert!(arguments.is_empty()),
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn unexpected_tokens_are_reported() {
    let cases = [
        ("let = 5;", "expected next token to be IDENT. got = instead"),
        ("let x 5;", "expected next token to be =. got INT instead"),
        ("(1 + 2", "expected next token to be ). got EOF instead"),
        ("add(1, 2", "expected next token to be ). got EOF instead"),
        ("if x { 1 }", "expected next token to be (. got IDENT instead"),
        ("fn(x, 1) { x }", "expected next token to be IDENT. got INT instead"),
    ];
    for (input, expected) in cases {
        let errors = parse_errors(input);
        assert_eq!(errors.first().map(String::as_str), Some(expected), "input: {}", input);
    }
    assert_eq!(parse_errors("let x 5;").len(), 1);
}

#[test]
fn missing_prefix_handler_is_reported() {
    let errors = parse_errors("let x = ;");
    assert_eq!(errors[0], "no prefix parse function for ;");

    let errors = parse_errors("5 + @");
    assert_eq!(errors, vec!["no prefix parse function for ILLEGAL"]);
}

#[test]
fn oversized_integer_is_reported() {
    assert_eq!(
        parse_errors("92233720368547758070"),
        vec!["could not parse 92233720368547758070 as integer"]
    );
}

#[test]
fn errors_accumulate_and_parsing_continues() {
    let (program, errors) = parse(Lexer::new("let = 1; let y 2; let z = 3;"));
    assert!(errors.len() >= 2, "{:?}", errors);
    assert!(program.statements.contains(&Statement::Let {
        name: "z".to_string(),
        value: Expression::Integer(3),
    }));
}

#[test]
fn printed_form_reparses_identically() {
    let sources = [
        "let add = fn(x, y) { x + y; }; add(2, 3);",
        "-a * b + !c",
        "if (x < y) { x } else { y }",
        "let f = fn() { return if (a == b) { 1 } else { -1 }; }; f()",
        "fn(x) { x; }(5)",
        "let newAdder = fn(x) { fn(y) { x + y } }; newAdder(1)(2)",
        "if (true) { }",
    ];
    for source in sources {
        let printed = parse_ok(source).to_string();
        let reprinted = parse_ok(&printed).to_string();
        assert_eq!(printed, reprinted, "source: {}", source);
    }
}

#[test]
fn parses_from_a_plain_token_vector() {
    let tokens = vec![
        Token::new(TokenKind::Int, "1"),
        Token::new(TokenKind::Plus, "+"),
        Token::new(TokenKind::Int, "2"),
    ];
    let (program, errors) = parse(tokens);
    assert!(errors.is_empty());
    assert_eq!(program.to_string(), "(1 + 2)");
}

#[test]
fn tracer_sees_balanced_rule_events() {
    let mut parser = Parser::new(Lexer::new("1 + 2")).with_tracer(RecordingTracer::default());
    parser.parse_program();

    let events = &parser.tracer().events;
    assert_eq!(events.first(), Some(&(true, "parse_statement", 0)));
    assert_eq!(events.last(), Some(&(false, "parse_statement", 0)));
    assert!(events.contains(&(true, "parse_infix_expression", 3)));

    let enters = events.iter().filter(|(enter, _, _)| *enter).count();
    assert_eq!(enters * 2, events.len());
}
