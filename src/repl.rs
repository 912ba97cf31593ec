// repl.rs

use crate::environment::Env;
use crate::evaluator::{EvalConfig, Evaluator};
use crate::parser::{parse_source, ParseError};
use std::io::{self, BufRead, Write};

const PROMPT: &str = ">> ";

/// Run an interactive session until end of input or `exit`.
///
/// Every line is parsed and evaluated against one shared environment, so
/// bindings made on one line are visible on the next. Parse and evaluation
/// errors are reported and the session carries on.
pub fn start<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    config: EvalConfig,
    trace_parser: bool,
) -> io::Result<()> {
    let mut evaluator = Evaluator::new(Env::new()).with_config(config);

    loop {
        write!(writer, "{}", PROMPT)?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            writeln!(writer)?;
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }

        let (program, errors) = parse_source(input, trace_parser);
        if !errors.is_empty() {
            print_parser_errors(&mut writer, &errors)?;
            continue;
        }

        if let Some(result) = evaluator.eval_program(&program) {
            writeln!(writer, "{}", result)?;
        }
    }

    Ok(())
}

fn print_parser_errors<W: Write>(writer: &mut W, errors: &[ParseError]) -> io::Result<()> {
    writeln!(writer, "parser errors:")?;
    for error in errors {
        writeln!(writer, "\t{}", error)?;
    }
    Ok(())
}
