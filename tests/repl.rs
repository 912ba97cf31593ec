use monkey::evaluator::EvalConfig;
use monkey::repl;
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn session(input: &str) -> String {
    session_with(input, EvalConfig::default())
}

fn session_with(input: &str, config: EvalConfig) -> String {
    let mut output = Vec::new();
    repl::start(Cursor::new(input), &mut output, config, false).expect("in-memory i/o");
    String::from_utf8(output).expect("utf-8 output")
}

#[test]
fn bindings_survive_across_lines() {
    let output = session("let x = 5;\nx * 2\nexit\n");
    assert_eq!(output, ">> >> 10\n>> ");
}

#[test]
fn errors_are_reported_and_the_session_continues() {
    let input = "foo\nlet y 1\n5 + true; 1\n1 + 1\nexit\n";
    let expected = concat!(
        ">> ERROR: identifier not found: foo\n",
        ">> parser errors:\n",
        "\texpected next token to be =. got INT instead\n",
        ">> ERROR: type mismatch: INTEGER + BOOLEAN\n",
        ">> 2\n",
        ">> ",
    );
    assert_eq!(session(input), expected);
}

#[test]
fn closures_work_across_lines() {
    let input = "let add = fn(a) { fn(b) { a + b } };\nlet inc = add(1);\ninc(41)\n";
    assert_eq!(session(input), ">> >> >> 42\n>> \n");
}

#[test]
fn blank_lines_are_skipped() {
    assert_eq!(session("\n   \ntrue\n"), ">> >> >> true\n>> \n");
}

#[test]
fn values_print_in_inspect_form() {
    let input = "if (false) { 1 }\nfn(x, y) { x + y }\n-7 / 2\n";
    let expected = ">> null\n>> fn(x, y) { (x + y) }\n>> -3\n>> \n";
    assert_eq!(session(input), expected);
}

#[test]
fn call_depth_limit_is_configurable() {
    let input = "let f = fn(n) { f(n + 1) };\nf(0)\n";
    let output = session_with(input, EvalConfig { max_depth: 10 });
    assert_eq!(
        output,
        ">> >> ERROR: stack overflow: maximum call depth of 10 exceeded\n>> \n"
    );
}

#[test]
fn a_failed_let_does_not_bind() {
    let input = "let z = 1 / 0;\nz\n";
    let expected = concat!(
        ">> ERROR: division by zero\n",
        ">> ERROR: identifier not found: z\n",
        ">> \n",
    );
    assert_eq!(session(input), expected);
}

#[test]
fn a_return_before_a_let_still_prints() {
    let input = "return 3; let x = 1;\nlet y = 2; y\nlet z = 3;\n";
    assert_eq!(session(input), ">> 3\n>> 2\n>> >> \n");
}
