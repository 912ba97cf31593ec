pub mod ast;
pub mod cli;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod stack;
pub mod trace;
