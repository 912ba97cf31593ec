use crate::environment::Env;
use crate::evaluator::{EvalConfig, Evaluator};
use crate::object::Object;
use crate::{parser, repl};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;
use thiserror::Error;

const ABOUT: &str = "Monkey - a tree-walking interpreter";

#[derive(Parser)]
#[command(name = "monkey", version, about = ABOUT, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Deepest chain of nested function calls before evaluation fails
    #[arg(long, global = true, default_value_t = EvalConfig::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log parser rule entry and exit (shown with RUST_LOG=monkey=trace)
    #[arg(long, global = true)]
    trace_parser: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (the default)
    Repl,
    /// Evaluate a source file and print its value
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("error reading file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

static TRACING_INIT: Once = Once::new();

/// Install the log subscriber. Only does anything when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = EvalConfig {
        max_depth: cli.max_depth,
    };

    let result = match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            println!("Starting Monkey REPL... (type `exit` to quit)");
            repl::start(io::stdin().lock(), io::stdout(), config, cli.trace_parser)
                .map(|()| ExitCode::SUCCESS)
                .map_err(CliError::from)
        }
        Commands::Run { file } => run_file(&file, config, cli.trace_parser),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_file(path: &Path, config: EvalConfig, trace_parser: bool) -> Result<ExitCode, CliError> {
    let source = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (program, errors) = parser::parse_source(&source, trace_parser);
    if !errors.is_empty() {
        eprintln!("parser errors:");
        for error in &errors {
            eprintln!("\t{}", error);
        }
        return Ok(ExitCode::FAILURE);
    }

    let mut evaluator = Evaluator::new(Env::new()).with_config(config);
    match evaluator.eval(&program) {
        Object::Error(err) => {
            eprintln!("ERROR: {}", err);
            Ok(ExitCode::FAILURE)
        }
        Object::Null => Ok(ExitCode::SUCCESS),
        value => {
            println!("{}", value);
            Ok(ExitCode::SUCCESS)
        }
    }
}
